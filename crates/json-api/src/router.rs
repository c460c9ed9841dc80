//! App Router

use salvo::Router;

use crate::{index, promotions};

pub(crate) fn app_router() -> Router {
    Router::new()
        .get(index::handler)
        .push(Router::with_path("promotions/{**id}").get(promotions::get::handler))
}
