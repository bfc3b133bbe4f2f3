//! Payment-form orders through Stripe Checkout Sessions.

use crate::coerce::parse_truthy;
use crate::error::StripeError;
use crate::settings::initialize_stripe;
use connectify_common::services::{
    AsyncPaymentSource, BoxFuture, Order, OrderRequest, OrderService, PaymentMethod,
};
use connectify_common::HTTP_CLIENT;
use connectify_config::StripeConfig;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Order service the save-order action depends on.
pub type DynOrderService = dyn OrderService<Error = StripeError>;

/// Payment type posted by a payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentType {
    Card,
    Ideal,
    Sofort,
}

impl FromStr for PaymentType {
    type Err = StripeError;

    /// Accepts the numeric codes `1`/`2`/`3` and the names, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "cc" | "card" => Ok(PaymentType::Card),
            "2" | "ideal" => Ok(PaymentType::Ideal),
            "3" | "sofort" => Ok(PaymentType::Sofort),
            other => Err(StripeError::invalid_input(
                "paymentType",
                format!("'{}' is not a payment type", other),
            )),
        }
    }
}

impl From<PaymentType> for PaymentMethod {
    fn from(t: PaymentType) -> Self {
        match t {
            PaymentType::Card => PaymentMethod::Card,
            PaymentType::Ideal => PaymentMethod::Ideal,
            PaymentType::Sofort => PaymentMethod::Sofort,
        }
    }
}

/// A posted payment form, split into the routing fields and the order itself.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    /// Hosted checkout when `true` (the default), Stripe Elements otherwise.
    pub enable_checkout: bool,
    pub payment_type: Option<PaymentType>,
    pub redirect: Option<String>,
    pub element_email: Option<String>,
    pub request: OrderRequest,
}

fn bracketed<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')
}

/// Largest amount Stripe accepts, in minor units (eight digits).
const MAX_AMOUNT: i64 = 99_999_999;

/// Major currency units ("12.50") to minor units (1250).
fn parse_amount(raw: &str) -> Result<i64, StripeError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| StripeError::invalid_input("amount", format!("'{}' is not an amount", raw)))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(StripeError::invalid_input(
            "amount",
            format!("'{}' must be positive", raw),
        ));
    }
    let minor = (amount * 100.0).round();
    if minor > MAX_AMOUNT as f64 {
        return Err(StripeError::invalid_input(
            "amount",
            format!("'{}' exceeds the maximum amount", raw),
        ));
    }
    Ok(minor as i64)
}

impl OrderSubmission {
    /// Parses the posted fields. Unrecognised fields end up in the order metadata.
    pub fn from_fields(fields: &[(String, String)]) -> Result<Self, StripeError> {
        let mut submission = OrderSubmission {
            enable_checkout: true,
            payment_type: None,
            redirect: None,
            element_email: None,
            request: OrderRequest::default(),
        };

        for (key, value) in fields {
            let non_empty = Some(value.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            match key.as_str() {
                "enableCheckout" => {
                    submission.enable_checkout = parse_truthy(value).ok_or_else(|| {
                        StripeError::invalid_input(key, format!("'{}' is not a boolean", value))
                    })?;
                }
                "paymentType" => {
                    submission.payment_type = match non_empty {
                        Some(v) => Some(v.parse()?),
                        None => None,
                    };
                }
                "redirect" => submission.redirect = non_empty,
                "stripeElementEmail" => submission.element_email = non_empty,
                "email" => submission.request.email = non_empty,
                "formId" => submission.request.form_id = non_empty,
                "currency" => submission.request.currency = non_empty.map(|c| c.to_lowercase()),
                "amount" => {
                    submission.request.amount = non_empty.as_deref().map(parse_amount).transpose()?;
                }
                "quantity" => {
                    submission.request.quantity = match non_empty {
                        Some(q) => Some(q.parse::<i64>().ok().filter(|q| *q > 0).ok_or_else(
                            || StripeError::invalid_input(key, format!("'{}' is not a quantity", q)),
                        )?),
                        None => None,
                    };
                }
                // Framework fields that carry no order data.
                "action" | "CRAFT_CSRF_TOKEN" => {}
                other => {
                    if let Some(part) = bracketed(other, "address") {
                        submission
                            .request
                            .address
                            .insert(part.to_string(), value.clone());
                    } else if let Some(v) = non_empty {
                        let name = bracketed(other, "metadata").unwrap_or(other);
                        submission.request.metadata.insert(name.to_string(), v);
                    }
                }
            }
        }

        Ok(submission)
    }
}

/// Runs a submission through the order service and returns where to send the customer.
pub async fn submit_order(
    orders: &DynOrderService,
    submission: OrderSubmission,
) -> Result<String, StripeError> {
    let OrderSubmission {
        enable_checkout,
        payment_type,
        redirect,
        element_email,
        mut request,
    } = submission;
    request.return_url = redirect.clone();

    if !enable_checkout {
        match payment_type {
            Some(async_type @ (PaymentType::Ideal | PaymentType::Sofort)) => {
                request.payment_method = Some(async_type.into());
                let source = orders
                    .process_asynchronous_payment(request)
                    .await?
                    .ok_or_else(|| {
                        StripeError::NotFound("Unable to process the Asynchronous Payment".into())
                    })?;
                debug!("Redirecting to asynchronous payment source {}", source.id);
                return Ok(source.redirect_url);
            }
            Some(PaymentType::Card) => {
                request.email = element_email;
                request.payment_method = Some(PaymentMethod::Card);
            }
            None => {}
        }
    }

    let order = orders
        .process_payment(request)
        .await?
        .ok_or_else(|| StripeError::NotFound("Unable to process the Payment".into()))?;
    info!("Order {} created ({})", order.number, order.reference);

    Ok(redirect_location(redirect.as_deref(), &order))
}

fn redirect_location(posted: Option<&str>, order: &Order) -> String {
    order
        .redirect_url
        .clone()
        .or_else(|| posted.map(|url| url.replace("{number}", &order.number)))
        .unwrap_or_else(|| "/".to_string())
}

#[derive(Deserialize, Debug)]
struct CheckoutSessionApiResponse {
    id: String,
    url: Option<String>,
}

/// [`OrderService`] creating Stripe Checkout Sessions.
#[derive(Debug, Clone)]
pub struct StripeOrderService {
    api_base_url: String,
    success_url: String,
    cancel_url: String,
    currency: Option<String>,
    unit_amount: Option<i64>,
    product_name: Option<String>,
    configured_key: Option<String>,
}

impl StripeOrderService {
    pub fn new(stripe_config: &StripeConfig) -> Self {
        Self {
            api_base_url: stripe_config.api_base_url.trim_end_matches('/').to_string(),
            success_url: stripe_config.success_url.clone(),
            cancel_url: stripe_config.cancel_url.clone(),
            currency: stripe_config.currency.clone(),
            unit_amount: stripe_config.unit_amount,
            product_name: stripe_config.product_name.clone(),
            configured_key: stripe_config.secret_key.clone(),
        }
    }

    fn form_body(
        &self,
        request: &OrderRequest,
        number: &str,
        method: PaymentMethod,
    ) -> Result<Vec<(String, String)>, StripeError> {
        let unit_amount = request
            .amount
            .or(self.unit_amount)
            .ok_or_else(|| StripeError::invalid_input("amount", "no amount posted or configured"))?;
        let currency = request
            .currency
            .clone()
            .or_else(|| self.currency.clone())
            .unwrap_or_else(|| "usd".to_string())
            .to_lowercase();
        let product_name = self
            .product_name
            .clone()
            .or_else(|| request.form_id.as_ref().map(|id| format!("Payment Form {}", id)))
            .unwrap_or_else(|| "Payment".to_string());
        let success_url = request
            .return_url
            .as_deref()
            .unwrap_or(&self.success_url)
            .replace("{number}", number);

        let mut form_body: Vec<(String, String)> = vec![
            ("payment_method_types[]".to_string(), method.as_stripe_type().to_string()),
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("client_reference_id".to_string(), number.to_string()),
            ("line_items[0][price_data][currency]".to_string(), currency),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                product_name,
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                unit_amount.to_string(),
            ),
            (
                "line_items[0][quantity]".to_string(),
                request.quantity.unwrap_or(1).to_string(),
            ),
            ("metadata[order_number]".to_string(), number.to_string()),
        ];
        if let Some(email) = &request.email {
            form_body.push(("customer_email".to_string(), email.clone()));
        }
        if let Some(form_id) = &request.form_id {
            form_body.push(("metadata[form_id]".to_string(), form_id.clone()));
        }
        for (key, value) in &request.address {
            form_body.push((format!("metadata[address_{}]", key), value.clone()));
        }
        for (key, value) in &request.metadata {
            form_body.push((format!("metadata[{}]", key), value.clone()));
        }
        Ok(form_body)
    }

    async fn create_checkout_session(
        &self,
        request: &OrderRequest,
        number: &str,
        method: PaymentMethod,
    ) -> Result<CheckoutSessionApiResponse, StripeError> {
        let secret_key = initialize_stripe(self.configured_key.as_deref())?;
        let form_body = self.form_body(request, number, method)?;
        let api_url = format!("{}/v1/checkout/sessions", self.api_base_url);

        info!(
            "[Stripe Orders] Creating {} checkout session for order {}",
            method.as_stripe_type(),
            number
        );
        let response = HTTP_CLIENT
            .post(&api_url)
            .basic_auth(secret_key, None::<&str>)
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body_text)?);
        }

        let error_message = match serde_json::from_str::<serde_json::Value>(&body_text) {
            Ok(json_body) => json_body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or(&body_text)
                .to_string(),
            Err(_) => body_text,
        };
        warn!(
            "[Stripe Orders] Stripe API request failed with HTTP status: {}. Message: {}",
            status, error_message
        );
        Err(StripeError::ApiError {
            status_code: status.as_u16(),
            message: error_message,
        })
    }

    fn order_number() -> String {
        Uuid::new_v4().simple().to_string()[..12].to_string()
    }
}

impl OrderService for StripeOrderService {
    type Error = StripeError;

    fn process_payment(&self, request: OrderRequest) -> BoxFuture<'_, Option<Order>, Self::Error> {
        Box::pin(async move {
            let number = Self::order_number();
            let method = request.payment_method.unwrap_or(PaymentMethod::Card);
            let session = self
                .create_checkout_session(&request, &number, method)
                .await?;

            let Some(url) = session.url else {
                warn!("[Stripe Orders] Session {} has no checkout URL", session.id);
                return Ok(None);
            };
            Ok(Some(Order {
                number,
                reference: session.id,
                redirect_url: Some(url),
            }))
        })
    }

    fn process_asynchronous_payment(
        &self,
        request: OrderRequest,
    ) -> BoxFuture<'_, Option<AsyncPaymentSource>, Self::Error> {
        Box::pin(async move {
            let method = match request.payment_method {
                Some(method @ (PaymentMethod::Ideal | PaymentMethod::Sofort)) => method,
                other => {
                    return Err(StripeError::invalid_input(
                        "paymentType",
                        format!("{:?} is not an asynchronous payment method", other),
                    ))
                }
            };
            let number = Self::order_number();
            let session = self
                .create_checkout_session(&request, &number, method)
                .await?;

            Ok(session.url.map(|redirect_url| AsyncPaymentSource {
                id: session.id,
                redirect_url,
            }))
        })
    }
}
