#[cfg(test)]
mod tests {
    use crate::error::StripeError;
    use crate::registry::{ConnectRegistry, ProductTypeOption};
    use crate::settings::{ConnectSettings, SettingsProvider};
    use connectify_common::services::{BoxFuture, OAuthService, OAuthToken};
    use connectify_db::{
        Commission, CommissionRepository, Connect, DbClient, ProductType, SqlCommissionRepository,
    };
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct StubSettings {
        global_rate: AtomicU64,
        commerce_enabled: bool,
    }

    impl StubSettings {
        fn new(global_rate: f64, commerce_enabled: bool) -> Self {
            Self {
                global_rate: AtomicU64::new(global_rate.to_bits()),
                commerce_enabled,
            }
        }

        fn set_global_rate(&self, rate: f64) {
            self.global_rate.store(rate.to_bits(), Ordering::SeqCst);
        }
    }

    impl SettingsProvider for StubSettings {
        fn settings(&self) -> ConnectSettings {
            ConnectSettings {
                global_rate: f64::from_bits(self.global_rate.load(Ordering::SeqCst)),
            }
        }

        fn is_plugin_enabled(&self, handle: &str) -> bool {
            handle == "commerce" && self.commerce_enabled
        }
    }

    /// Accepts "good-code", rejects "bad-code" as an invalid grant, fails otherwise.
    struct StubOAuth;

    impl OAuthService for StubOAuth {
        type Error = StripeError;

        fn token(&self, code: &str) -> BoxFuture<'_, OAuthToken, Self::Error> {
            let code = code.to_string();
            Box::pin(async move {
                match code.as_str() {
                    "good-code" => Ok(OAuthToken {
                        stripe_user_id: "acct_123".to_string(),
                        scope: Some("read_write".to_string()),
                        livemode: Some(false),
                        token_type: Some("bearer".to_string()),
                    }),
                    "bad-code" => Err(StripeError::InvalidGrant("no such code".to_string())),
                    _ => Err(StripeError::ApiError {
                        status_code: 500,
                        message: "unavailable".to_string(),
                    }),
                }
            })
        }
    }

    struct Fixture {
        db: DbClient,
        settings: Arc<StubSettings>,
        registry: ConnectRegistry,
        commissions: SqlCommissionRepository,
    }

    async fn fixture(commerce_enabled: bool) -> Fixture {
        let db = DbClient::from_url("sqlite::memory:").await.unwrap();
        let settings = Arc::new(StubSettings::new(10.0, commerce_enabled));
        let registry = ConnectRegistry::new(db.clone(), settings.clone(), Arc::new(StubOAuth));
        registry.init_schema().await.unwrap();
        Fixture {
            commissions: SqlCommissionRepository::new(db.clone()),
            db,
            settings,
            registry,
        }
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        }
    }

    async fn stored(f: &Fixture, products: &[&str], vendor_id: Option<i64>, all: bool) -> Connect {
        let connect = f.registry.create("payment-form").await.unwrap();
        let connect = f
            .registry
            .populate_from_input(
                connect,
                &fields(json!({
                    "products": products,
                    "vendorId": vendor_id,
                    "allProducts": all,
                })),
            )
            .unwrap();
        f.registry.save(connect).await.unwrap()
    }

    async fn add_commissions(f: &Fixture, connect_id: i64, count: usize) {
        for n in 0..count {
            f.commissions
                .create(Commission::new(
                    connect_id,
                    format!("ORD-{}", n),
                    10.0,
                    "EUR".to_string(),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_supported_types_without_commerce() {
        let f = fixture(false).await;
        let types = f.registry.list_supported_product_types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].product_type, ProductType::PaymentForm);
        assert!(types[0].is_built_in);
    }

    #[tokio::test]
    async fn test_supported_types_as_options_with_commerce() {
        let f = fixture(true).await;
        assert_eq!(
            f.registry.list_supported_product_types_as_options(),
            vec![
                ProductTypeOption {
                    label: "Payment Form".to_string(),
                    value: ProductType::PaymentForm,
                },
                ProductTypeOption {
                    label: "Product (Commerce)".to_string(),
                    value: ProductType::CommerceProduct,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_create_uses_current_global_rate() {
        let f = fixture(false).await;
        let first = f.registry.create("payment-form").await.unwrap();
        assert!(first.id.is_some());
        assert!(!first.enabled);
        assert_eq!(first.rate, 10.0);

        f.settings.set_global_rate(7.5);
        let second = f.registry.create("payment-form").await.unwrap();
        assert_eq!(second.rate, 7.5);
        assert_ne!(first.id, second.id);

        let resolved = f.registry.resolve_by_id(second.id.unwrap()).await.unwrap();
        assert_eq!(resolved, Some(second));
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_types() {
        let f = fixture(false).await;
        assert!(matches!(
            f.registry.create("commerce-product").await,
            Err(StripeError::InvalidProductType(_))
        ));
        assert!(matches!(
            f.registry.create("anything").await,
            Err(StripeError::InvalidProductType(_))
        ));

        let f = fixture(true).await;
        let connect = f.registry.create("commerce-product").await.unwrap();
        assert_eq!(connect.product_type, ProductType::CommerceProduct);
    }

    #[tokio::test]
    async fn test_populate_rejects_type_of_disabled_add_on() {
        let f = fixture(false).await;
        let connect = f.registry.create("payment-form").await.unwrap();

        let result = f.registry.populate_from_input(
            connect.clone(),
            &fields(json!({ "productType": "commerce-product" })),
        );
        assert!(matches!(result, Err(StripeError::InvalidProductType(_))));

        let stored = f.registry.resolve_by_id(connect.id.unwrap()).await.unwrap();
        assert_eq!(stored.map(|c| c.product_type), Some(ProductType::PaymentForm));

        let f = fixture(true).await;
        let connect = f.registry.create("payment-form").await.unwrap();
        let updated = f
            .registry
            .populate_from_input(connect, &fields(json!({ "productType": "commerce-product" })))
            .unwrap();
        assert_eq!(updated.product_type, ProductType::CommerceProduct);
    }

    #[tokio::test]
    async fn test_resolve_missing_is_none() {
        let f = fixture(false).await;
        assert_eq!(f.registry.resolve_by_id(404).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_populate_coerces_all_products() {
        let f = fixture(false).await;
        let connect = Connect::new(ProductType::PaymentForm, 1.0);

        let on = f
            .registry
            .populate_from_input(connect.clone(), &fields(json!({ "allProducts": "1" })))
            .unwrap();
        assert!(on.all_products);

        let off = f
            .registry
            .populate_from_input(on, &fields(json!({ "allProducts": "no" })))
            .unwrap();
        assert!(!off.all_products);

        let err = f
            .registry
            .populate_from_input(connect, &fields(json!({ "allProducts": "banana" })))
            .unwrap_err();
        assert!(matches!(err, StripeError::InvalidInput { ref field, .. } if field == "allProducts"));
    }

    #[tokio::test]
    async fn test_populate_takes_first_vendor_and_ignores_unknown_keys() {
        let f = fixture(false).await;
        let connect = f
            .registry
            .populate_from_input(
                Connect::new(ProductType::PaymentForm, 1.0),
                &fields(json!({
                    "vendorId": [7, 8],
                    "enabled": "on",
                    "rate": "12.5",
                    "products": "[\"4\",\"2\"]",
                    "id": 99,
                    "color": "blue",
                })),
            )
            .unwrap();

        assert_eq!(connect.vendor_id, Some(7));
        assert!(connect.enabled);
        assert_eq!(connect.rate, 12.5);
        assert_eq!(connect.products, vec!["4".to_string(), "2".to_string()]);
        assert_eq!(connect.id, None);
    }

    #[tokio::test]
    async fn test_populate_rejects_malformed_values() {
        let f = fixture(false).await;
        let base = Connect::new(ProductType::PaymentForm, 1.0);
        for bad in [
            json!({ "rate": "ten" }),
            json!({ "vendorId": "seven" }),
            json!({ "products": 5 }),
            json!({ "enabled": "maybe" }),
        ] {
            let err = f
                .registry
                .populate_from_input(base.clone(), &fields(bad.clone()))
                .unwrap_err();
            assert!(matches!(err, StripeError::InvalidInput { .. }), "{bad}");
        }

        let err = f
            .registry
            .populate_from_input(base, &fields(json!({ "productType": "gift-card" })))
            .unwrap_err();
        assert!(matches!(err, StripeError::InvalidProductType(_)));
    }

    #[tokio::test]
    async fn test_save_of_deleted_connect_is_not_found() {
        let f = fixture(false).await;
        let mut ghost = Connect::new(ProductType::PaymentForm, 1.0);
        ghost.id = Some(31);
        assert!(matches!(
            f.registry.save(ghost).await,
            Err(StripeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_connect_and_commissions() {
        let f = fixture(false).await;
        let connect = stored(&f, &["1"], Some(5), false).await;
        let id = connect.id.unwrap();
        add_commissions(&f, id, 3).await;
        add_commissions(&f, id + 1000, 1).await;

        assert!(f.registry.delete(&connect).await.unwrap());

        assert_eq!(f.registry.resolve_by_id(id).await.unwrap(), None);
        assert!(f.commissions.find_by_connect_id(id).await.unwrap().is_empty());
        assert_eq!(
            f.commissions.find_by_connect_id(id + 1000).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete_rolls_back_when_store_reports_failure() {
        let f = fixture(false).await;
        let connect = stored(&f, &["1", "2"], Some(5), false).await;
        let id = connect.id.unwrap();
        add_commissions(&f, id, 3).await;

        // The delete statement succeeds but removes nothing.
        f.db.execute(
            "CREATE TRIGGER keep_connects BEFORE DELETE ON connects \
             BEGIN SELECT RAISE(IGNORE); END",
        )
        .await
        .unwrap();

        assert!(!f.registry.delete(&connect).await.unwrap());

        assert_eq!(f.commissions.find_by_connect_id(id).await.unwrap().len(), 3);
        let still_there = f.registry.resolve_by_id(id).await.unwrap().unwrap();
        assert_eq!(still_there.products, vec!["1".to_string(), "2".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_propagates_store_errors_and_rolls_back() {
        let f = fixture(false).await;
        let connect = stored(&f, &["1"], Some(5), false).await;
        let id = connect.id.unwrap();
        add_commissions(&f, id, 3).await;

        f.db.execute(
            "CREATE TRIGGER lock_commissions BEFORE DELETE ON commissions \
             BEGIN SELECT RAISE(ABORT, 'commission locked'); END",
        )
        .await
        .unwrap();

        let err = f.registry.delete(&connect).await.unwrap_err();
        assert!(matches!(err, StripeError::Database(_)), "{err:?}");

        assert_eq!(f.commissions.find_by_connect_id(id).await.unwrap().len(), 3);
        assert!(f.registry.resolve_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_of_unsaved_connect_reports_failure() {
        let f = fixture(false).await;
        let unsaved = Connect::new(ProductType::PaymentForm, 1.0);
        assert!(!f.registry.delete(&unsaved).await.unwrap());
    }

    #[tokio::test]
    async fn test_exchange_authorization_code() {
        let f = fixture(false).await;
        assert_eq!(
            f.registry.exchange_authorization_code("good-code").await,
            Some("acct_123".to_string())
        );
        assert_eq!(f.registry.exchange_authorization_code("bad-code").await, None);
        assert_eq!(f.registry.exchange_authorization_code("network").await, None);
    }

    #[tokio::test]
    async fn test_find_by_product_id_is_exact_and_payment_form_only() {
        let f = fixture(true).await;
        stored(&f, &["142"], Some(5), false).await;
        let hit = stored(&f, &["42", "7"], Some(5), false).await;

        let commerce = f.registry.create("commerce-product").await.unwrap();
        let commerce = f
            .registry
            .populate_from_input(commerce, &fields(json!({ "products": ["42"] })))
            .unwrap();
        f.registry.save(commerce).await.unwrap();

        let found = f.registry.find_by_product_id("42", None).await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(hit.id));

        assert!(f
            .registry
            .find_by_product_id("42", Some(6))
            .await
            .unwrap()
            .is_none());
        assert!(f
            .registry
            .find_by_product_id("4", None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_by_product_id_skips_all_products_connects() {
        let f = fixture(false).await;
        let listed = stored(&f, &["9"], Some(1), false).await;
        stored(&f, &["9"], Some(2), true).await;

        let found = f
            .registry
            .list_by_product_id("9", None, ProductType::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, listed.id);

        let all = f
            .registry
            .list_with_all_products(ProductType::PaymentForm)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].all_products);
    }

    #[tokio::test]
    async fn test_list_by_vendor_id_filters() {
        let f = fixture(true).await;
        stored(&f, &["1"], Some(5), false).await;
        stored(&f, &[], Some(5), true).await;
        stored(&f, &["1"], Some(6), false).await;
        let commerce = f.registry.create("commerce-product").await.unwrap();
        let commerce = f
            .registry
            .populate_from_input(commerce, &fields(json!({ "vendorId": 5 })))
            .unwrap();
        f.registry.save(commerce).await.unwrap();

        let everything = f.registry.list_by_vendor_id(5, None, None).await.unwrap();
        assert_eq!(everything.len(), 3);
        assert!(everything.iter().all(|c| c.vendor_id == Some(5)));

        let explicit = f
            .registry
            .list_by_vendor_id(5, Some(false), None)
            .await
            .unwrap();
        assert_eq!(explicit.len(), 2);
        assert!(explicit.iter().all(|c| !c.all_products));

        let commerce_only = f
            .registry
            .list_by_vendor_id(5, None, Some(ProductType::CommerceProduct))
            .await
            .unwrap();
        assert_eq!(commerce_only.len(), 1);
    }
}
