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
        admin::UserList,
        auth::{LoginResponse, SessionInfo},
        cart::{CartSummary, ClearResult, RemoveResult},
        contacts::ContactList,
        orders::OrderList,
        products::{CategoryCount, ProductDetail, ProductList},
        reports::{DashboardSummary, SalesReport},
        wishlist::{ToggleResult, WishlistList},
    },
    error::ErrorData,
    models::{CartRow, ContactMessage, Order, OrderLine, Product, PublicUser, Review, WishlistRow},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, contacts, health, orders, params, products, wishlist},
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
        auth::login,
        auth::register,
        auth::me,
        products::list_products,
        products::list_categories,
        products::get_product,
        products::add_review,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_row,
        cart::clear_cart,
        wishlist::list_wishlist,
        wishlist::toggle_wishlist,
        wishlist::remove_wishlist,
        wishlist::move_to_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::cancel_order,
        contacts::submit_contact,
        admin::dashboard,
        admin::sales_report,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::list_low_stock,
        admin::adjust_inventory,
        admin::list_users,
        admin::update_user_role,
        admin::delete_user,
        admin::list_contacts,
        admin::mark_contact_read,
        admin::delete_contact
    ),
    components(
        schemas(
            PublicUser,
            Product,
            CartRow,
            WishlistRow,
            Order,
            OrderLine,
            Review,
            ContactMessage,
            ProductList,
            ProductDetail,
            CategoryCount,
            CartSummary,
            RemoveResult,
            ClearResult,
            WishlistList,
            ToggleResult,
            OrderList,
            ContactList,
            UserList,
            DashboardSummary,
            SalesReport,
            SessionInfo,
            LoginResponse,
            ErrorData,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<CartRow>,
            ApiResponse<CartSummary>,
            ApiResponse<Order>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Session endpoints"),
        (name = "Products", description = "Catalog and reviews"),
        (name = "Cart", description = "Cart rows reconciled against stock"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Contacts", description = "Contact form"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
