//! Authenticated-identity extractors.
//!
//! Authentication itself happens upstream; the gateway forwards the verified
//! identity as `x-user-id`, `x-user-email` and `x-user-role` headers and this
//! service trusts them. Handlers declare the identity they need as an
//! extractor argument.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

fn identity_from_request(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let header = |name: &str| -> Result<&str, AppError> {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::NotAuthorized)
    };

    let id = header(USER_ID_HEADER)?
        .parse::<Uuid>()
        .map_err(|_| AppError::NotAuthorized)?;
    let email = header(USER_EMAIL_HEADER)?.to_string();
    let role = match header(USER_ROLE_HEADER) {
        Ok(r) if r.eq_ignore_ascii_case("admin") => Role::Admin,
        _ => Role::Customer,
    };

    Ok(AuthenticatedUser { id, email, role })
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_request(req))
    }
}

/// Identity that must carry the admin role; catalog writes require it.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_request(req).and_then(|user| {
            if user.role == Role::Admin {
                Ok(AdminUser(user))
            } else {
                Err(AppError::NotAuthorized)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn request_with(id: &str, email: &str, role: Option<&str>) -> HttpRequest {
        let mut req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id))
            .insert_header((USER_EMAIL_HEADER, email));
        if let Some(role) = role {
            req = req.insert_header((USER_ROLE_HEADER, role));
        }
        req.to_http_request()
    }

    #[test]
    fn extracts_customer_identity() {
        let id = Uuid::new_v4();
        let req = request_with(&id.to_string(), "user@example.com", None);

        let user = identity_from_request(&req).expect("identity should parse");
        assert_eq!(user.id, id);
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn extracts_admin_role_case_insensitively() {
        let req = request_with(&Uuid::new_v4().to_string(), "a@example.com", Some("Admin"));
        let user = identity_from_request(&req).expect("identity should parse");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn missing_id_header_is_rejected() {
        let req = TestRequest::default()
            .insert_header((USER_EMAIL_HEADER, "user@example.com"))
            .to_http_request();
        assert!(identity_from_request(&req).is_err());
    }

    #[test]
    fn malformed_id_is_rejected() {
        let req = request_with("42", "user@example.com", None);
        assert!(identity_from_request(&req).is_err());
    }

    #[test]
    fn unknown_role_falls_back_to_customer() {
        let req = request_with(&Uuid::new_v4().to_string(), "u@example.com", Some("staff"));
        let user = identity_from_request(&req).expect("identity should parse");
        assert_eq!(user.role, Role::Customer);
    }
}
