use crate::utils::constants::{DEFAULT_IS_MARKETPLACE, DEFAULT_ORDERS_TYPE, DEFAULT_PAGE, DEFAULT_PER_PAGE};

/// Query forwarded to the paginated orders endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersQuery {
    pub page: i32,
    pub per_page: i32,
    pub orders_type: String,
    pub is_marketplace: String,
    pub filter: Option<String>,
}

impl Default for OrdersQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            orders_type: DEFAULT_ORDERS_TYPE.to_owned(),
            is_marketplace: DEFAULT_IS_MARKETPLACE.to_owned(),
            filter: None,
        }
    }
}

impl OrdersQuery {
    /// Query pairs in upstream order; `filter` only when non-empty.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("orders_type", self.orders_type.to_owned()),
            ("is_marketplace", self.is_marketplace.to_owned()),
        ];
        if let Some(filter) = self.filter.as_ref().filter(|f| !f.is_empty()) {
            params.push(("filter", filter.to_owned()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_is_not_forwarded() {
        let query = OrdersQuery {
            filter: Some(String::new()),
            ..OrdersQuery::default()
        };
        let keys: Vec<_> = query.to_params().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["page", "per_page", "orders_type", "is_marketplace"]);
    }

    #[test]
    fn filter_is_appended_last() {
        let query = OrdersQuery {
            filter: Some("status=delivered&city=Lusaka".into()),
            ..OrdersQuery::default()
        };
        let params = query.to_params();
        assert_eq!(params.last(), Some(&("filter", "status=delivered&city=Lusaka".to_owned())));
    }
}
