//! Импорт заказов: выборка по диапазону дат, создание недостающих
//! локальных заказов и сверка существующих. Ошибка по одному заказу
//! не прерывает пакет — заказ считается пропущенным.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use contracts::domain::a002_local_order::aggregate::{LocalOrder, OrderStatus};
use contracts::shared::settings::SyncSettings;
use contracts::shared::sync_result::SyncRunResult;
use contracts::usecases::u502_import_orders::request::ImportOrdersRequest;

use crate::domain::a001_catalog_item::service as catalog_service;
use crate::domain::a002_local_order::service as order_service;
use crate::shared::marketplaces::nalda::client::{NaldaApiClient, RemoteOrder, RemoteOrderItem};

use super::reconciler;

pub struct ImportOrdersExecutor {
    client: Arc<NaldaApiClient>,
}

impl ImportOrdersExecutor {
    pub fn new(client: Arc<NaldaApiClient>) -> Self {
        Self { client }
    }

    pub async fn run(
        &self,
        settings: &SyncSettings,
        request: &ImportOrdersRequest,
    ) -> SyncRunResult {
        match self.execute(settings, request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Order import failed: {:#}", e);
                SyncRunResult::error(format!("Order import failed: {}", e))
            }
        }
    }

    async fn execute(
        &self,
        settings: &SyncSettings,
        request: &ImportOrdersRequest,
    ) -> Result<SyncRunResult> {
        let today = Utc::now().date_naive();
        let date_to = request.date_to.unwrap_or(today);
        let date_from = request
            .date_from
            .unwrap_or_else(|| today - Duration::days(settings.order_import_days_back.max(0)));

        let remote_orders = self.client.fetch_orders(settings, date_from, date_to).await?;

        let mut created: i64 = 0;
        let mut updated: i64 = 0;
        let mut skipped: i64 = 0;

        for remote in &remote_orders {
            match self.import_one(settings, remote).await {
                Ok(ImportOutcome::Created) => created += 1,
                Ok(ImportOutcome::Updated) => updated += 1,
                Ok(ImportOutcome::Unchanged) => {}
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Order {} skipped: {:#}", remote.order_id, e);
                }
            }
        }

        tracing::info!(
            "Order import finished: {} created, {} updated, {} skipped of {} fetched",
            created,
            updated,
            skipped,
            remote_orders.len()
        );

        Ok(SyncRunResult::ok(format!(
            "Imported orders: {} created, {} updated, {} skipped",
            created, updated, skipped
        ))
        .with_count("created", created)
        .with_count("updated", updated)
        .with_count("skipped", skipped))
    }

    async fn import_one(
        &self,
        settings: &SyncSettings,
        remote: &RemoteOrder,
    ) -> Result<ImportOutcome> {
        let items = self
            .client
            .fetch_order_items(settings, &remote.order_id)
            .await?;

        match order_service::find_by_remote_id(&remote.order_id).await? {
            // На один заказ маркетплейса — ровно один локальный заказ
            Some(mut order) => self.update_existing(&mut order, remote, &items).await,
            None => self.create_new(settings, remote, &items).await,
        }
    }

    /// Создание: заказ пишется в черновом статусе Pending, остатки
    /// списываются, и только затем заказ переводится в Processing —
    /// уведомления магазина должны видеть уже полный заказ.
    async fn create_new(
        &self,
        settings: &SyncSettings,
        remote: &RemoteOrder,
        items: &[RemoteOrderItem],
    ) -> Result<ImportOutcome> {
        let mut order = reconciler::build_new_order(remote, items, settings);
        order_service::create(&order).await?;

        if settings.reduce_stock_on_import {
            for line in order.lines.iter_mut() {
                if catalog_service::adjust_stock_by_gtin(&line.gtin, -line.quantity).await? {
                    line.reduced_stock = true;
                }
            }
        }

        order.status = OrderStatus::Processing;
        order.last_sync_at = Some(Utc::now());
        order_service::save(&order).await?;

        tracing::info!("Created local order for Nalda order {}", remote.order_id);
        Ok(ImportOutcome::Created)
    }

    /// Сверка: заказ сохраняется только при реальном изменении —
    /// холостой опрос не трогает ни запись, ни заметки.
    async fn update_existing(
        &self,
        order: &mut LocalOrder,
        remote: &RemoteOrder,
        items: &[RemoteOrderItem],
    ) -> Result<ImportOutcome> {
        let outcome = reconciler::reconcile(order, remote, items);

        for (gtin, quantity) in &outcome.stock_restores {
            catalog_service::adjust_stock_by_gtin(gtin, *quantity).await?;
        }

        if !outcome.changed {
            return Ok(ImportOutcome::Unchanged);
        }

        order.last_sync_at = Some(Utc::now());
        order_service::save(order).await?;
        Ok(ImportOutcome::Updated)
    }
}

enum ImportOutcome {
    Created,
    Updated,
    Unchanged,
}
