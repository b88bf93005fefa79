use rust_decimal::Decimal;

use crate::error::ApiError;

pub const MAX_NAME_LEN: usize = 150;
pub const MAX_USUARIO_LEN: usize = 100;
pub const MAX_SIGLAS_LEN: usize = 20;
pub const MAX_UNIDAD_LEN: usize = 50;
/// `NUMERIC(18, 4)`: 14 integer digits and 4 decimal places
pub const VALOR_SCALE: u32 = 4;
pub const VALOR_INTEGER_DIGITS: u32 = 14;
pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Trim a display name and check it is non-empty and within bounds
pub fn name(field: &str, raw: &str) -> Result<String, ApiError> {
    bounded_name(field, raw, MAX_NAME_LEN)
}

/// Like [`name`] with a column-specific limit
pub fn bounded_name(field: &str, raw: &str, max: usize) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_field(field, "This field is required"));
    }
    check_len(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Optional text that must fit a `VARCHAR(max)` column
pub fn optional_bounded(field: &str, raw: Option<&str>, max: usize) -> Result<Option<String>, ApiError> {
    let text = optional_text(raw);
    if let Some(ref t) = text {
        check_len(field, t, max)?;
    }
    Ok(text)
}

fn check_len(field: &str, text: &str, max: usize) -> Result<(), ApiError> {
    if text.chars().count() > max {
        return Err(ApiError::invalid_field(field, format!("Must be at most {} characters", max)));
    }
    Ok(())
}

/// A monthly value must be stored exactly: at most 4 decimal places and
/// 14 integer digits. Null is always accepted.
pub fn valor(valor: Option<Decimal>) -> Result<Option<Decimal>, ApiError> {
    let Some(v) = valor else {
        return Ok(None);
    };
    let v = v.normalize();
    if v.scale() > VALOR_SCALE {
        return Err(ApiError::invalid_field(
            "valor",
            format!("At most {} decimal places are allowed", VALOR_SCALE),
        ));
    }
    let limit = Decimal::from(10i64.pow(VALOR_INTEGER_DIGITS));
    if v.abs() >= limit {
        return Err(ApiError::invalid_field(
            "valor",
            format!("At most {} integer digits are allowed", VALOR_INTEGER_DIGITS),
        ));
    }
    Ok(Some(v))
}

pub fn year(anio: i32) -> Result<i32, ApiError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&anio) {
        Ok(anio)
    } else {
        Err(ApiError::invalid_field(
            "anio",
            format!("Year must be between {} and {}", MIN_YEAR, MAX_YEAR),
        ))
    }
}

pub fn month(mes: i32) -> Result<i32, ApiError> {
    if (1..=12).contains(&mes) {
        Ok(mes)
    } else {
        Err(ApiError::invalid_field("mes", "Month must be between 1 and 12"))
    }
}

pub fn password(clave: &str) -> Result<(), ApiError> {
    if clave.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::UnprocessableEntity {
            message: format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            field_errors: None,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(name("nombre", "  Hidrocentro ").unwrap(), "Hidrocentro");
        assert!(name("nombre", "   ").is_err());
        assert!(name("nombre", &"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(name("nombre", &"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn optional_text_collapses_blank() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some(" m3 ")).as_deref(), Some("m3"));
    }

    #[test]
    fn year_and_month_ranges() {
        assert!(year(1999).is_err());
        assert_eq!(year(2024).unwrap(), 2024);
        assert!(year(2101).is_err());
        assert!(month(0).is_err());
        assert_eq!(month(12).unwrap(), 12);
        assert!(month(13).is_err());
    }

    #[test]
    fn column_limits() {
        assert!(bounded_name("usuario", &"u".repeat(MAX_USUARIO_LEN), MAX_USUARIO_LEN).is_ok());
        assert!(bounded_name("usuario", &"u".repeat(120), MAX_USUARIO_LEN).is_err());
        assert_eq!(optional_bounded("siglas", Some("  "), MAX_SIGLAS_LEN).unwrap(), None);
        assert_eq!(
            optional_bounded("siglas", Some(" HC "), MAX_SIGLAS_LEN).unwrap().as_deref(),
            Some("HC")
        );
        let err = optional_bounded("siglas", Some(&"S".repeat(30)), MAX_SIGLAS_LEN).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(optional_bounded("unidad", Some(&"m".repeat(51)), MAX_UNIDAD_LEN).is_err());
    }

    #[test]
    fn valor_must_fit_the_column() {
        use std::str::FromStr;
        let d = |s: &str| Decimal::from_str(s).unwrap();

        assert_eq!(valor(None).unwrap(), None);
        assert_eq!(valor(Some(d("1.2345"))).unwrap(), Some(d("1.2345")));
        // Trailing zeros do not count as precision
        assert_eq!(valor(Some(d("2.500000"))).unwrap(), Some(d("2.5")));
        assert_eq!(valor(Some(d("99999999999999.9999"))).unwrap(), Some(d("99999999999999.9999")));
        assert_eq!(valor(Some(d("-42"))).unwrap(), Some(d("-42")));

        assert_eq!(valor(Some(d("1.234567"))).unwrap_err().status_code(), 400);
        assert_eq!(valor(Some(d("1000000000000000"))).unwrap_err().status_code(), 400);
        assert!(valor(Some(d("-100000000000000"))).is_err());
    }

    #[test]
    fn short_passwords_are_unprocessable() {
        assert_eq!(password("12345").unwrap_err().status_code(), 422);
        assert!(password("123456").is_ok());
    }
}
