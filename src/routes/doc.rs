use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        orders::{CheckoutReceipt, CheckoutRequest, OrderList, OrderWithItems},
        ratings::{RateStoreRequest, RatingStats},
        stores::UpdateAvailabilityRequest,
        upgrades::{DecideUpgradeRequest, SubmitUpgradeRequest, UpgradeDecision, UpgradeRequestList},
    },
    entity::{
        orders::{DeliveryOption, OrderStatus, PaymentMethod},
        stores::SubscriptionTier,
        upgrade_requests::UpgradeStatus,
    },
    models::{Order, OrderItem, StoreAvailability, UpgradeRequest},
    response::{ApiResponse, Meta},
    routes::{admin, health, orders, params, stores},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness_check,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        stores::get_availability,
        stores::update_availability,
        stores::list_store_orders,
        stores::finish_order,
        stores::delete_order,
        stores::get_rating_stats,
        stores::rate_store,
        stores::submit_upgrade_request,
        admin::list_upgrade_requests,
        admin::decide_upgrade
    ),
    components(
        schemas(
            Order,
            OrderItem,
            OrderStatus,
            DeliveryOption,
            PaymentMethod,
            SubscriptionTier,
            UpgradeStatus,
            UpgradeRequest,
            StoreAvailability,
            CheckoutRequest,
            CheckoutReceipt,
            OrderList,
            OrderWithItems,
            UpdateAvailabilityRequest,
            RateStoreRequest,
            RatingStats,
            SubmitUpgradeRequest,
            DecideUpgradeRequest,
            UpgradeDecision,
            UpgradeRequestList,
            params::Pagination,
            params::OrderListQuery,
            params::UpgradeListQuery,
            Meta,
            ApiResponse<CheckoutReceipt>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<UpgradeRequest>,
            ApiResponse<RatingStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Orders", description = "Checkout and shopper orders"),
        (name = "Stores", description = "Store availability, fulfillment, ratings and tier requests"),
        (name = "Admin", description = "Operator endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
