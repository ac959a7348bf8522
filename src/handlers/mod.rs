pub mod customer;
pub mod order;
pub mod report;
pub mod restaurant;

// Re-export routers for easier importing
pub use customer::router as customer_router;
pub use order::router as order_router;
pub use report::router as report_router;
pub use restaurant::router as restaurant_router;

use utoipa::OpenApi;

use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        customer::create_customer,
        customer::get_customer,
        customer::list_customer_orders,
        restaurant::create_restaurant,
        restaurant::list_menu,
        restaurant::create_menu_item,
        restaurant::update_menu_item,
        order::create_order,
        order::get_order,
        order::update_order_status,
        report::top_customers,
        report::top_menu_items,
        report::restaurant_revenue,
    ),
    components(
        schemas(
            customer::CreateCustomerRequest,
            customer::CustomerResponse,
            restaurant::CreateRestaurantRequest,
            restaurant::RestaurantResponse,
            restaurant::CreateMenuItemRequest,
            restaurant::UpdateMenuItemRequest,
            restaurant::MenuItemResponse,
            order::CreateOrderRequest,
            order::OrderItemRequest,
            order::UpdateOrderStatusRequest,
            order::OrderResponse,
            order::OrderItemResponse,
            report::TopCustomerResponse,
            report::TopMenuItemResponse,
            report::RevenueResponse,
            crate::error::ApiErrorResponse,
        )
    ),
    tags(
        (name = "customers", description = "Customer management endpoints"),
        (name = "restaurants", description = "Restaurant and menu management endpoints"),
        (name = "orders", description = "Order placement and tracking endpoints"),
        (name = "reports", description = "Reporting and insight endpoints")
    ),
    info(
        title = "Foodcourt API",
        description = "REST API for the foodcourt delivery platform",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;
