use thiserror::Error;

/// Коды ошибок сервиса загрузки CSV (фиксированная таблица)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorCode {
    ValidationError,
    LicenseExpired,
    LicenseRevoked,
    DomainMismatch,
    LicenseNotFound,
    RateLimitExceeded,
    InternalError,
    Unknown,
}

impl UploadErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "VALIDATION_ERROR" => UploadErrorCode::ValidationError,
            "LICENSE_EXPIRED" => UploadErrorCode::LicenseExpired,
            "LICENSE_REVOKED" => UploadErrorCode::LicenseRevoked,
            "DOMAIN_MISMATCH" => UploadErrorCode::DomainMismatch,
            "LICENSE_NOT_FOUND" => UploadErrorCode::LicenseNotFound,
            "RATE_LIMIT_EXCEEDED" => UploadErrorCode::RateLimitExceeded,
            "INTERNAL_ERROR" => UploadErrorCode::InternalError,
            _ => UploadErrorCode::Unknown,
        }
    }

    /// Сообщение для пользователя по коду ошибки
    pub fn user_message(&self) -> &'static str {
        match self {
            UploadErrorCode::ValidationError => {
                "The upload request was rejected as invalid. Check the SFTP credentials and file name."
            }
            UploadErrorCode::LicenseExpired => {
                "The license has expired. Renew it to continue synchronizing."
            }
            UploadErrorCode::LicenseRevoked => "The license has been revoked.",
            UploadErrorCode::DomainMismatch => {
                "The shop domain does not match the licensed domain."
            }
            UploadErrorCode::LicenseNotFound => "No license was found for the given key.",
            UploadErrorCode::RateLimitExceeded => {
                "Too many uploads in a short period. Try again later."
            }
            UploadErrorCode::InternalError => {
                "The upload service reported an internal error. Try again later."
            }
            UploadErrorCode::Unknown => "The upload service returned an unknown error.",
        }
    }
}

/// Ошибка загрузки CSV, уже отображённая в пользовательское сообщение
#[derive(Debug, Error)]
#[error("{} ({})", .code.user_message(), .raw_code)]
pub struct NaldaUploadError {
    pub code: UploadErrorCode,
    pub raw_code: String,
}

impl NaldaUploadError {
    pub fn from_raw(raw_code: &str) -> Self {
        Self {
            code: UploadErrorCode::parse(raw_code),
            raw_code: raw_code.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_table() {
        let cases = [
            ("VALIDATION_ERROR", UploadErrorCode::ValidationError),
            ("LICENSE_EXPIRED", UploadErrorCode::LicenseExpired),
            ("LICENSE_REVOKED", UploadErrorCode::LicenseRevoked),
            ("DOMAIN_MISMATCH", UploadErrorCode::DomainMismatch),
            ("LICENSE_NOT_FOUND", UploadErrorCode::LicenseNotFound),
            ("RATE_LIMIT_EXCEEDED", UploadErrorCode::RateLimitExceeded),
            ("INTERNAL_ERROR", UploadErrorCode::InternalError),
            ("SOMETHING_ELSE", UploadErrorCode::Unknown),
        ];
        for (raw, expected) in cases {
            assert_eq!(UploadErrorCode::parse(raw), expected);
        }
    }

    #[test]
    fn test_upload_error_display_includes_raw_code() {
        let err = NaldaUploadError::from_raw("LICENSE_EXPIRED");
        let text = err.to_string();
        assert!(text.contains("expired"));
        assert!(text.contains("LICENSE_EXPIRED"));
    }
}
