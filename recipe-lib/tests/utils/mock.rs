use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::HttpMessage;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use recipe_lib::user::UserId;
use tracing_actix_web::RootSpan;

/// Stands in for the bearer validator. Every request is made as `user_id`, which is recorded on
/// the root span like a verified token would be.
#[derive(Clone, Copy, Debug)]
pub struct MockAuthentication {
    user_id: UserId,
}

impl MockAuthentication {
    pub fn as_user(user_id: UserId) -> MockAuthentication {
        MockAuthentication { user_id }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MockAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = AuthenticatedAs<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticatedAs {
            service,
            user_id: self.user_id,
        }))
    }
}

pub struct AuthenticatedAs<S> {
    service: S,
    user_id: UserId,
}

impl<S, B> Service<ServiceRequest> for AuthenticatedAs<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(root_span) = req.extensions().get::<RootSpan>() {
            root_span.record("user_id", self.user_id);
        }
        req.extensions_mut().insert(self.user_id);
        Box::pin(self.service.call(req))
    }
}
