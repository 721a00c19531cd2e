//! Чистая логика сверки локального заказа с данными маркетплейса.
//! Функции не ходят в БД и не делают HTTP — все эффекты (возврат
//! остатков, сохранение) возвращаются наружу и применяются executor'ом.

use chrono::{DateTime, NaiveDate, Utc};
use contracts::domain::a002_local_order::aggregate::{
    DeliveryState, LocalOrder, LocalOrderId, OrderAddress, OrderLine, OrderStatus,
};
use contracts::domain::common::EntityMetadata;
use contracts::shared::settings::SyncSettings;

use crate::shared::marketplaces::nalda::client::{RemoteOrder, RemoteOrderItem};

/// Метод оплаты, проставляемый при выплате от маркетплейса
pub const PAYMENT_METHOD: &str = "nalda_payout";

/// Биллинг каждого заказа указывает на юрлицо маркетплейса, а не на
/// конечного покупателя — так заказ не виден в покупательских
/// кабинетах магазина.
pub fn nalda_billing_identity() -> OrderAddress {
    OrderAddress {
        first_name: "Nalda".to_string(),
        last_name: "Marketplace".to_string(),
        company: Some("Nalda GmbH".to_string()),
        street: "Marktplatz 1".to_string(),
        city: "Berlin".to_string(),
        postcode: "10115".to_string(),
        country: "DE".to_string(),
        email: None,
        phone: None,
    }
}

/// Итог сверки. `stock_restores` — пары (GTIN, количество), по которым
/// executor должен вернуть остаток на склад.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub changed: bool,
    pub stock_restores: Vec<(String, i32)>,
}

/// Разобрать дату из произвольного поля API. Эпоха и невалидные
/// строки отбрасываются — маркетплейс присылает "1970-01-01" вместо
/// null у незаполненных дат.
pub fn parse_remote_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })?;

    if date <= NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() {
        return None;
    }
    Some(date)
}

/// Момент создания заказа на стороне маркетплейса (UTC полночь даты,
/// если пришла только дата)
pub fn parse_remote_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        let dt = dt.with_timezone(&Utc);
        if dt.timestamp() > 0 {
            return Some(dt);
        }
        return None;
    }
    parse_remote_date(raw)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

fn is_paid_out(payout_status: &str) -> bool {
    matches!(
        payout_status.trim().to_lowercase().as_str(),
        "paid_out" | "paid"
    )
}

fn build_line(item: &RemoteOrderItem) -> OrderLine {
    OrderLine {
        gtin: item.gtin.clone(),
        title: item.title.clone().unwrap_or_else(|| item.gtin.clone()),
        quantity: item.quantity,
        unit_price: item.unit_price,
        net_unit_price: OrderLine::net_price(item.unit_price, item.commission, item.quantity),
        commission: item.commission,
        delivery_status: item
            .delivery_status
            .as_deref()
            .and_then(DeliveryState::parse),
        reduced_stock: false,
        restored_stock: false,
    }
}

/// Состояние доставки нового заказа: первый item с непустым статусом,
/// иначе начальное IN_PREPARATION
fn initial_delivery_state(items: &[RemoteOrderItem]) -> DeliveryState {
    items
        .iter()
        .find_map(|i| i.delivery_status.as_deref().and_then(DeliveryState::parse))
        .unwrap_or(DeliveryState::InPreparation)
}

/// Построить новый локальный заказ в черновом статусе Pending.
/// Переход в Processing выполняет executor последним шагом, когда все
/// позиции и остатки уже обработаны.
pub fn build_new_order(
    remote: &RemoteOrder,
    items: &[RemoteOrderItem],
    settings: &SyncSettings,
) -> LocalOrder {
    let created_at = remote
        .created_at
        .as_deref()
        .and_then(parse_remote_datetime)
        .unwrap_or_else(Utc::now);

    let customer = &remote.customer;
    let address = &remote.shipping_address;
    let shipping = OrderAddress {
        first_name: customer.first_name.clone().unwrap_or_default(),
        last_name: customer.last_name.clone().unwrap_or_default(),
        company: address.company.clone(),
        street: address.street.clone().unwrap_or_default(),
        city: address.city.clone().unwrap_or_default(),
        postcode: address.postcode.clone().unwrap_or_default(),
        country: address.country.clone().unwrap_or_default(),
        email: customer.email.clone(),
        phone: customer.phone.clone(),
    };

    let mut meta = std::collections::BTreeMap::new();
    meta.insert("_nalda_order_id".to_string(), remote.order_id.clone());
    if let Some(email) = &customer.email {
        meta.insert("_nalda_customer_email".to_string(), email.clone());
    }

    let expected_delivery_date = items
        .first()
        .and_then(|i| i.planned_delivery_date.as_deref())
        .and_then(parse_remote_date);

    let mut order = LocalOrder {
        id: LocalOrderId::new_v4(),
        remote_order_id: remote.order_id.clone(),
        status: OrderStatus::Pending,
        currency: remote
            .currency
            .clone()
            .unwrap_or_else(|| settings.currency.clone()),
        billing: nalda_billing_identity(),
        shipping,
        lines: items.iter().map(build_line).collect(),
        delivery_state: Some(initial_delivery_state(items)),
        payout_status: remote.payout_status.clone(),
        is_paid: false,
        payment_method: None,
        date_paid: None,
        refund_amount: remote.refund_amount.unwrap_or(0.0),
        expected_delivery_date,
        tracking_code: None,
        meta,
        notes: Vec::new(),
        last_sync_at: None,
        metadata: EntityMetadata::with_created_at(created_at),
    };

    order.add_note(format!("Imported from Nalda order {}", remote.order_id));
    order
}

/// Сверить существующий заказ с данными маркетплейса. Мутирует заказ
/// на месте; `changed == false` означает, что записывать нечего —
/// заказ и его заметки остаются нетронутыми.
pub fn reconcile(
    order: &mut LocalOrder,
    remote: &RemoteOrder,
    items: &[RemoteOrderItem],
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for item in items {
        reconcile_item_delivery(order, item, &mut outcome);
    }

    reconcile_payout(order, remote, &mut outcome);
    reconcile_refund(order, remote, &mut outcome);
    reconcile_expected_date(order, items, &mut outcome);

    outcome
}

/// Переход статуса доставки позиции и каскадные переходы статуса
/// заказа. Односторонние "храповики": срабатывают только при
/// обнаруженном отличии, а не на каждом опросе.
fn reconcile_item_delivery(
    order: &mut LocalOrder,
    item: &RemoteOrderItem,
    outcome: &mut ReconcileOutcome,
) {
    let Some(new_state) = item.delivery_status.as_deref().and_then(DeliveryState::parse) else {
        return;
    };

    let Some(line) = order.line_by_gtin_mut(&item.gtin) else {
        return;
    };

    let previous = line.delivery_status;
    if previous == Some(new_state) {
        return;
    }

    // Возврат остатка ровно один раз: только на переходе В
    // отменённое/возвращённое состояние ИЗ неотменённого
    let entered_release = new_state.releases_stock()
        && !previous.map(|p| p.releases_stock()).unwrap_or(false);
    if entered_release && line.reduced_stock && !line.restored_stock {
        line.restored_stock = true;
        outcome
            .stock_restores
            .push((line.gtin.clone(), line.quantity));
    }

    line.delivery_status = Some(new_state);
    outcome.changed = true;

    let gtin = item.gtin.clone();
    order.add_note(format!(
        "Nalda delivery status for {} changed to {}",
        gtin,
        new_state.as_str()
    ));
    order.delivery_state = Some(new_state);

    match new_state {
        DeliveryState::Delivered => {
            if order.status != OrderStatus::Completed {
                order.status = OrderStatus::Completed;
                order.add_note("Order completed: Nalda reported delivery");
            }
        }
        DeliveryState::Cancelled => {
            if !matches!(order.status, OrderStatus::Cancelled | OrderStatus::Refunded) {
                order.status = OrderStatus::Cancelled;
                order.add_note("Order cancelled: Nalda reported cancellation");
            }
        }
        DeliveryState::Returned => {
            if order.status != OrderStatus::Refunded {
                order.status = OrderStatus::Refunded;
                order.add_note("Order refunded: Nalda reported return");
            }
        }
        DeliveryState::InPreparation | DeliveryState::Shipped => {}
    }
}

/// Статус выплаты: переход в paid_out помечает заказ оплаченным,
/// обратный переход снимает отметку (сторнирование выплат поддержано
/// в обе стороны).
fn reconcile_payout(order: &mut LocalOrder, remote: &RemoteOrder, outcome: &mut ReconcileOutcome) {
    let new_status = remote.payout_status.clone();
    if new_status == order.payout_status {
        return;
    }

    let now_paid = new_status.as_deref().map(is_paid_out).unwrap_or(false);
    order.payout_status = new_status;
    outcome.changed = true;

    if now_paid && !order.is_paid {
        order.is_paid = true;
        order.payment_method = Some(PAYMENT_METHOD.to_string());
        order.date_paid = Some(Utc::now());
        order.add_note("Marked as paid: Nalda payout completed");
    } else if !now_paid && order.is_paid {
        order.is_paid = false;
        order.payment_method = None;
        order.date_paid = None;
        order.add_note("Payment mark removed: Nalda payout reversed");
    }
}

fn reconcile_refund(order: &mut LocalOrder, remote: &RemoteOrder, outcome: &mut ReconcileOutcome) {
    let Some(new_amount) = remote.refund_amount else {
        return;
    };
    if (new_amount - order.refund_amount).abs() < 1e-9 {
        return;
    }

    order.add_note(format!(
        "Refund amount changed: {:.2} -> {:.2}",
        order.refund_amount, new_amount
    ));
    order.refund_amount = new_amount;
    outcome.changed = true;
}

fn reconcile_expected_date(
    order: &mut LocalOrder,
    items: &[RemoteOrderItem],
    outcome: &mut ReconcileOutcome,
) {
    let Some(new_date) = items
        .first()
        .and_then(|i| i.planned_delivery_date.as_deref())
        .and_then(parse_remote_date)
    else {
        return;
    };

    if order.expected_delivery_date == Some(new_date) {
        return;
    }
    order.expected_delivery_date = Some(new_date);
    outcome.changed = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::marketplaces::nalda::client::{RemoteAddress, RemoteCustomer};

    fn remote_order(id: &str) -> RemoteOrder {
        RemoteOrder {
            order_id: id.to_string(),
            customer: RemoteCustomer {
                first_name: Some("Erika".to_string()),
                last_name: Some("Mustermann".to_string()),
                email: Some("erika@example.com".to_string()),
                phone: None,
            },
            shipping_address: RemoteAddress {
                street: Some("Hauptstr. 5".to_string()),
                city: Some("Hamburg".to_string()),
                postcode: Some("20095".to_string()),
                country: Some("DE".to_string()),
                company: None,
            },
            currency: Some("EUR".to_string()),
            created_at: Some("2024-01-01T10:00:00Z".to_string()),
            payout_status: Some("pending".to_string()),
            fee_amount: None,
            commission_amount: None,
            refund_amount: Some(0.0),
        }
    }

    fn remote_item(gtin: &str, status: Option<&str>) -> RemoteOrderItem {
        RemoteOrderItem {
            gtin: gtin.to_string(),
            title: Some(format!("Item {}", gtin)),
            quantity: 2,
            unit_price: 20.0,
            commission: 4.0,
            delivery_status: status.map(|s| s.to_string()),
            planned_delivery_date: None,
        }
    }

    fn new_order(status: Option<&str>) -> (LocalOrder, RemoteOrder, Vec<RemoteOrderItem>) {
        let remote = remote_order("N-100");
        let items = vec![remote_item("40063813", status)];
        let order = build_new_order(&remote, &items, &SyncSettings::default());
        (order, remote, items)
    }

    #[test]
    fn test_new_order_shape() {
        let (order, _, _) = new_order(None);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.remote_order_id, "N-100");
        assert_eq!(order.billing.company.as_deref(), Some("Nalda GmbH"));
        assert_eq!(order.shipping.first_name, "Erika");
        assert_eq!(order.delivery_state, Some(DeliveryState::InPreparation));
        // net = 20 - 4/2 = 18
        assert_eq!(order.lines[0].net_unit_price, 18.0);
    }

    #[test]
    fn test_net_price_floor() {
        assert_eq!(OrderLine::net_price(2.0, 10.0, 2), 0.0);
        assert_eq!(OrderLine::net_price(20.0, 4.0, 2), 18.0);
        assert_eq!(OrderLine::net_price(20.0, 4.0, 0), 0.0);
    }

    #[test]
    fn test_noop_reconcile_leaves_order_untouched() {
        let (mut order, remote, items) = new_order(Some("IN_PREPARATION"));
        let notes_before = order.notes.len();

        let outcome = reconcile(&mut order, &remote, &items);
        assert!(!outcome.changed);
        assert!(outcome.stock_restores.is_empty());
        assert_eq!(order.notes.len(), notes_before);
    }

    #[test]
    fn test_delivered_completes_order_once() {
        let (mut order, remote, _) = new_order(Some("SHIPPED"));
        let items = vec![remote_item("40063813", Some("DELIVERED"))];

        let outcome = reconcile(&mut order, &remote, &items);
        assert!(outcome.changed);
        assert_eq!(order.status, OrderStatus::Completed);
        let notes_after_first = order.notes.len();

        // Повторный опрос с тем же статусом ничего не меняет
        let outcome = reconcile(&mut order, &remote, &items);
        assert!(!outcome.changed);
        assert_eq!(order.notes.len(), notes_after_first);
    }

    #[test]
    fn test_stock_restored_exactly_once() {
        let (mut order, remote, _) = new_order(Some("IN_PREPARATION"));
        order.lines[0].reduced_stock = true;

        let cancelled = vec![remote_item("40063813", Some("CANCELLED"))];
        let outcome = reconcile(&mut order, &remote, &cancelled);
        assert_eq!(outcome.stock_restores, vec![("40063813".to_string(), 2)]);
        assert!(order.lines[0].restored_stock);

        // Второй опрос с тем же CANCELLED — возврата больше нет
        let outcome = reconcile(&mut order, &remote, &cancelled);
        assert!(outcome.stock_restores.is_empty());

        // И даже переход CANCELLED -> RETURNED не возвращает повторно
        let returned = vec![remote_item("40063813", Some("RETURNED"))];
        let outcome = reconcile(&mut order, &remote, &returned);
        assert!(outcome.stock_restores.is_empty());
        assert_eq!(order.status, OrderStatus::Refunded);
    }

    #[test]
    fn test_payout_transition_both_ways() {
        let (mut order, mut remote, items) = new_order(Some("IN_PREPARATION"));
        assert!(!order.is_paid);

        remote.payout_status = Some("paid_out".to_string());
        let outcome = reconcile(&mut order, &remote, &items);
        assert!(outcome.changed);
        assert!(order.is_paid);
        assert_eq!(order.payment_method.as_deref(), Some(PAYMENT_METHOD));
        assert!(order.date_paid.is_some());
        let paid_notes = order
            .notes
            .iter()
            .filter(|n| n.message.contains("payout completed"))
            .count();
        assert_eq!(paid_notes, 1);

        // Третий опрос с неизменным paid_out — без новых заметок
        let outcome = reconcile(&mut order, &remote, &items);
        assert!(!outcome.changed);

        // Обратный переход снимает отметку об оплате
        remote.payout_status = Some("pending".to_string());
        let outcome = reconcile(&mut order, &remote, &items);
        assert!(outcome.changed);
        assert!(!order.is_paid);
        assert!(order.payment_method.is_none());
        assert!(order.date_paid.is_none());
    }

    #[test]
    fn test_refund_amount_updates_on_numeric_diff_only() {
        let (mut order, mut remote, items) = new_order(Some("IN_PREPARATION"));

        remote.refund_amount = Some(0.0);
        assert!(!reconcile(&mut order, &remote, &items).changed);

        remote.refund_amount = Some(5.5);
        assert!(reconcile(&mut order, &remote, &items).changed);
        assert_eq!(order.refund_amount, 5.5);
    }

    #[test]
    fn test_expected_date_refresh_rejects_epoch() {
        let (mut order, remote, _) = new_order(Some("IN_PREPARATION"));
        order.expected_delivery_date = None;

        let mut items = vec![remote_item("40063813", Some("IN_PREPARATION"))];
        items[0].planned_delivery_date = Some("1970-01-01".to_string());
        assert!(!reconcile(&mut order, &remote, &items).changed);
        assert!(order.expected_delivery_date.is_none());

        items[0].planned_delivery_date = Some("2024-02-10".to_string());
        assert!(reconcile(&mut order, &remote, &items).changed);
        assert_eq!(
            order.expected_delivery_date,
            NaiveDate::from_ymd_opt(2024, 2, 10)
        );
    }

    #[test]
    fn test_parse_remote_date_formats() {
        assert_eq!(
            parse_remote_date("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            parse_remote_date("2024-03-01T12:30:00+01:00"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_remote_date(""), None);
        assert_eq!(parse_remote_date("not-a-date"), None);
        assert_eq!(parse_remote_date("1970-01-01"), None);
    }
}
