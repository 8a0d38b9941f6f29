use std::{env, str::FromStr};

use anyhow::{Context, Result};

use super::{
    config_model::{
        Autocomplete, BackendServer, Database, DotEnvyConfig, Google, JwtConfig, Razorpay, Stripe,
    },
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required_parse("SERVER_PORT_BACKEND")?,
        body_limit: required_parse("SERVER_BODY_LIMIT")?,
        timeout: required_parse("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let jwt = JwtConfig {
        secret: required("JWT_SECRET")?,
        ttl_hours: optional_parse("JWT_TTL_HOURS", 168)?,
    };

    let google = Google {
        client_id: required("GOOGLE_CLIENT_ID")?,
        client_secret: required("GOOGLE_CLIENT_SECRET")?,
        redirect_uri: required("GOOGLE_REDIRECT_URI")?,
        places_api_key: required("GOOGLE_PLACES_API_KEY")?,
    };

    let autocomplete = Autocomplete {
        cache_ttl_secs: optional_parse("AUTOCOMPLETE_CACHE_TTL_SECS", 300)?,
        cache_capacity: optional_parse("AUTOCOMPLETE_CACHE_CAPACITY", 100)?,
    };

    let stripe = Stripe {
        secret_key: required("STRIPE_SECRET_KEY")?,
        webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
        currency: env::var("STRIPE_CURRENCY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "usd".to_string()),
    };

    let razorpay = Razorpay {
        key_id: required("RAZORPAY_KEY_ID")?,
        key_secret: required("RAZORPAY_KEY_SECRET")?,
    };

    let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN")
        .ok()
        .filter(|v| !v.trim().is_empty());

    Ok(DotEnvyConfig {
        stage: get_stage(),
        backend_server,
        database,
        jwt,
        google,
        autocomplete,
        stripe,
        razorpay,
        cors_allowed_origin,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} is invalid"))
}

pub fn required_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} is invalid"))
}

pub fn optional_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_parse_falls_back_when_unset() {
        unsafe {
            env::remove_var("CONFIG_TEST_UNSET_VALUE");
        }
        assert_eq!(optional_parse("CONFIG_TEST_UNSET_VALUE", 300_u64).unwrap(), 300);
    }

    #[test]
    fn invalid_number_names_the_variable() {
        unsafe {
            env::set_var("CONFIG_TEST_BAD_PORT", "eighty");
        }
        let err = required_parse::<u16>("CONFIG_TEST_BAD_PORT").unwrap_err();
        assert!(err.to_string().contains("CONFIG_TEST_BAD_PORT"));
    }

    #[test]
    fn missing_required_names_the_variable() {
        unsafe {
            env::remove_var("CONFIG_TEST_MISSING_SECRET");
        }
        let err = required("CONFIG_TEST_MISSING_SECRET").unwrap_err();
        assert_eq!(err.to_string(), "CONFIG_TEST_MISSING_SECRET is invalid");
    }
}
