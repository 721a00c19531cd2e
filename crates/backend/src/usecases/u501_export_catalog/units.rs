//! Конвертация единиц измерения для экспорта.
//! Пустое или нулевое значение даёт None ("поле не заполнено"), а не
//! ноль — получатель различает "нет данных" и явный ноль.
//! Неизвестная единица трактуется как уже целевая (мм/г): один кривой
//! тег единицы не должен ронять весь экспорт.

/// Длина в миллиметрах, округление до целого
pub fn to_millimeters(value: Option<f64>, unit: &str) -> Option<i64> {
    let value = value?;
    if value == 0.0 {
        return None;
    }

    let factor = match unit.trim().to_lowercase().as_str() {
        "m" => 1000.0,
        "cm" => 10.0,
        "mm" => 1.0,
        "in" => 25.4,
        "yd" => 914.4,
        _ => 1.0,
    };

    Some((value * factor).round() as i64)
}

/// Вес в граммах
pub fn to_grams(value: Option<f64>, unit: &str) -> Option<f64> {
    let value = value?;
    if value == 0.0 {
        return None;
    }

    let factor = match unit.trim().to_lowercase().as_str() {
        "kg" => 1000.0,
        "g" => 1.0,
        "lbs" => 453.592,
        "oz" => 28.3495,
        _ => 1.0,
    };

    Some(value * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversion() {
        assert_eq!(to_millimeters(Some(1.0), "m"), Some(1000));
        assert_eq!(to_millimeters(Some(2.5), "cm"), Some(25));
        assert_eq!(to_millimeters(Some(12.0), "mm"), Some(12));
        assert_eq!(to_millimeters(Some(1.0), "in"), Some(25));
        assert_eq!(to_millimeters(Some(1.0), "yd"), Some(914));
    }

    #[test]
    fn test_weight_conversion() {
        assert_eq!(to_grams(Some(1.5), "kg"), Some(1500.0));
        assert_eq!(to_grams(Some(250.0), "g"), Some(250.0));
        assert_eq!(to_grams(Some(1.0), "lbs"), Some(453.592));
        assert_eq!(to_grams(Some(2.0), "oz"), Some(56.699));
    }

    #[test]
    fn test_empty_and_zero_stay_empty() {
        assert_eq!(to_millimeters(None, "cm"), None);
        assert_eq!(to_millimeters(Some(0.0), "cm"), None);
        assert_eq!(to_grams(None, "kg"), None);
        assert_eq!(to_grams(Some(0.0), "kg"), None);
    }

    #[test]
    fn test_unknown_unit_is_identity() {
        assert_eq!(to_millimeters(Some(42.0), "furlong"), Some(42));
        assert_eq!(to_grams(Some(42.0), ""), Some(42.0));
    }
}
