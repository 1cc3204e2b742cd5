use crate::error::{AppError, AppResult};
use crate::models::CurrentUser;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            // 完全匹配的公开路径
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/v1/products",
            ],
            // 前缀匹配的公开路径
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/v1/products/"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

/// 校验 Bearer token，并把 CurrentUser 写入 request extensions
pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S> AuthMiddlewareService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> AppResult<CurrentUser> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))?;

        let claims = self
            .jwt_service
            .verify_access_token(token)
            .map_err(|_| AppError::AuthError("Invalid access token".to_string()))?;

        Ok(CurrentUser {
            id: claims.user_id()?,
            is_admin: claims.is_admin(),
        })
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS || self.public_paths.is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        match self.authenticate(&req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(error) => Box::pin(async move { Err(error.into()) }),
        }
    }
}

/// 取当前登录用户
pub fn current_user(req: &HttpRequest) -> AppResult<CurrentUser> {
    req.extensions()
        .get::<CurrentUser>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))
}

/// 取当前用户并要求管理员身份
pub fn require_admin(req: &HttpRequest) -> AppResult<CurrentUser> {
    let user = current_user(req)?;
    if !user.is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/swagger-ui/index.html"));
        assert!(paths.is_public_path("/api/v1/products"));
        assert!(paths.is_public_path("/api/v1/products/12"));
        assert!(!paths.is_public_path("/api/v1/productsX"));
        assert!(!paths.is_public_path("/api/v1/orders"));
        assert!(!paths.is_public_path("/api/v1/admin/orders"));
    }
}
