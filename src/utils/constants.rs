//! Shared constants and invariants

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_REFERENCE_TTL_SECS: u64 = 60 * 60 * 24;
pub const DEFAULT_SERVICE_NAME: &str = "boxleo";

// Upstream paths, relative to the configured base url
pub const LOGIN_PATH: &str = "/api/login";
pub const ORDERS_PATH: &str = "/api/orders-paginated";
pub const CANCELLATION_REASONS_PATH: &str = "/api/cancellation-reasons";

// Fixed headers the upstream web client sends with every call
pub const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
pub const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.7";
pub const SELECTED_COUNTRY_HEADER: &str = "x-selected-country";
pub const SELECTED_WAREHOUSE_HEADER: &str = "x-selected-warehouse";
pub const SELECTED_WAREHOUSE_VALUE: &str = "null";
pub const SELECTED_COUNTRY_VALUE: &str = concat!(
    r#"{"id":20,"old_id":"5","name":"zambia","currency":"ZMW","currency_exchange_rate":1,"#,
    r#""flag":"zm","phone_code":"+260","timezone":"Africa/Lusaka","#,
    r#""office_address":"Off Fox Dale, Fox Dale Road, Lusaka, Lusaka Province,\nZambia","#,
    r#""latitude":null,"longitude":null,"created_at":"2025-07-11T06:01:20.000000Z","#,
    r#""updated_at":"2025-07-11T06:01:20.000000Z","deleted_at":null,"#,
    r#""terms":"USSD MERCHANT PAYMENT *543*859223*amount# Airtel merchant code payment details *115* 889004130 *amount# For more information, please contact us within 12 hours of receiving the order","#,
    r#""phone":null,"email":"zambia@boxleocourier.ccom","about":null,"notes":null}"#
);

// Inbound query defaults
pub const DEFAULT_PAGE: i32 = 1;
pub const DEFAULT_PER_PAGE: i32 = 15;
pub const DEFAULT_CSV_PER_PAGE: i32 = 5000;
pub const DEFAULT_ORDERS_TYPE: &str = "leads";
pub const DEFAULT_IS_MARKETPLACE: &str = "all";

pub const CSV_FILE_NAME: &str = "boxleo-orders.csv";
