//! DTO for the OData-style query options on `GET /Countries`.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::query::QueryOptions;

/// `$filter`, `$orderby`, `$skip` and `$top` as received on the query string.
///
/// Numeric options are parsed from their decimal text; anything else is
/// rejected before reaching the service.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ODataParams {
    #[serde(rename = "$filter")]
    pub filter: Option<String>,

    #[serde(rename = "$orderby")]
    pub order_by: Option<String>,

    #[serde(rename = "$skip")]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,

    #[serde(rename = "$top")]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub top: Option<i64>,
}

impl ODataParams {
    /// True when any query option is present, switching the listing into query mode.
    pub fn is_query(&self) -> bool {
        self.filter.is_some() || self.order_by.is_some() || self.skip.is_some() || self.top.is_some()
    }
}

impl From<ODataParams> for QueryOptions {
    fn from(params: ODataParams) -> Self {
        QueryOptions {
            filter: params.filter,
            order_by: params.order_by,
            skip: params.skip,
            top: params.top,
        }
    }
}
