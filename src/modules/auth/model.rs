pub use schoolhub_models::auth::{
    LoginRequest, LoginResponse, MessageResponse, SignupRequest, SignupResponse,
};
