//! Header values shared by the client and the middlewares.
//!
//! Header *names* come from `http::header` (re-exported by axum and reqwest).

pub const APPLICATION_JSON: &str = "application/json";

/// Authentication scheme accepted in the `Authorization` header.
pub const BEARER_SCHEME: &str = "Bearer";

/// Default allowed origin. Not reflected per request.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";

pub const DEFAULT_ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

pub const DEFAULT_ALLOWED_HEADERS: &str = "Authorization,Content-Type,Accept,Origin,User-Agent,DNT,Cache-Control,X-Mx-ReqToken,Keep-Alive,X-Requested-With,If-Modified-Since,x-referer";
