use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    budget::BudgetSnapshot,
    dto::{
        admin::{MaintenanceRequest, OverrideResetReport, PurgeReport, SetMasterBudgetRequest},
        auth::{LoginRequest, LoginResponse},
        budget::BudgetResponse,
        orders::{
            OrderItemRequest, OrderList, PlaceOrderRequest, PlaceOrderResponse, PlacedItem,
            PlacedOrder,
        },
        security::{ResetAttemptsRequest, ResetAttemptsResponse, SecurityStatus},
    },
    error::ErrorData,
    middleware::auth::ADMIN_KEY_HEADER,
    models::{Account, OrderLine},
    response::{ApiResponse, ApiStatus, Meta},
    routes::{admin, auth, budget, exec, health, orders, params, security},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_KEY_HEADER))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        budget::get_budget,
        orders::list_orders,
        orders::place_order,
        security::security_status,
        security::reset_login_attempts,
        admin::list_all_orders,
        admin::set_master_budget,
        admin::reset_overrides,
        admin::purge_orders,
        exec::exec
    ),
    components(
        schemas(
            Account,
            OrderLine,
            BudgetSnapshot,
            LoginRequest,
            LoginResponse,
            BudgetResponse,
            OrderItemRequest,
            PlaceOrderRequest,
            PlacedItem,
            PlacedOrder,
            PlaceOrderResponse,
            OrderList,
            SecurityStatus,
            ResetAttemptsRequest,
            ResetAttemptsResponse,
            SetMasterBudgetRequest,
            MaintenanceRequest,
            OverrideResetReport,
            PurgeReport,
            exec::ServiceInfo,
            params::Pagination,
            params::SortOrder,
            ErrorData,
            ApiStatus,
            Meta,
            ApiResponse<LoginResponse>,
            ApiResponse<BudgetResponse>,
            ApiResponse<PlaceOrderResponse>,
            ApiResponse<OrderList>,
            ApiResponse<SecurityStatus>,
            ApiResponse<ErrorData>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Staff login with lockout"),
        (name = "Budget", description = "Monthly budget endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Security", description = "Login throttle administration"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Exec", description = "Legacy action dispatcher"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
