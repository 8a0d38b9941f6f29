use anyhow::Result;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

/// Razorpay Orders API client for subscription checkouts.
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: Option<String>,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id,
            key_secret,
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// https://razorpay.com/docs/api/orders/create/
    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<RazorpayOrder> {
        let resp = self
            .http
            .post("https://api.razorpay.com/v1/orders")
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderRequest {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, response_body = %body, "razorpay: create order failed");
            anyhow::bail!("Razorpay order creation failed (status {})", status);
        }

        let order: RazorpayOrder = resp.json().await?;
        Ok(order)
    }

    /// Checks the checkout signature, an HMAC-SHA256 of `"{order_id}|{payment_id}"`.
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool> {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());

        let Ok(provided) = hex::decode(signature.trim()) else {
            return Ok(false);
        };
        Ok(mac.verify_slice(&provided).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RazorpayClient {
        RazorpayClient::new("rzp_test_key".to_string(), "rzp_secret".to_string())
    }

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(b"rzp_secret").unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn matching_signature_verifies() {
        let signature = sign("order_1", "pay_1");
        assert!(client()
            .verify_payment_signature("order_1", "pay_1", &signature)
            .unwrap());
    }

    #[test]
    fn signature_for_another_payment_fails() {
        let signature = sign("order_1", "pay_2");
        assert!(!client()
            .verify_payment_signature("order_1", "pay_1", &signature)
            .unwrap());
    }

    #[test]
    fn non_hex_signature_fails_without_error() {
        assert!(!client()
            .verify_payment_signature("order_1", "pay_1", "not-hex")
            .unwrap());
    }
}
