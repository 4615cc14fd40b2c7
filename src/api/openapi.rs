//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, feedback_handler, user_handler};
use crate::domain::{FeedbackResponse, GiverInfo, Sentiment, UserResponse, UserRole, UserSummary};
use crate::services::TokenResponse;
use crate::types::MessageResponse;

/// OpenAPI documentation for the feedback tracker
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Feedback Tracker",
        version = "0.1.0",
        description = "Team feedback between managers and developers"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        // Directory endpoints
        user_handler::assign_manager,
        user_handler::change_manager,
        user_handler::list_team,
        user_handler::get_manager,
        user_handler::list_all,
        user_handler::list_managers,
        user_handler::get_user,
        // Feedback endpoints
        feedback_handler::create_feedback,
        feedback_handler::update_feedback,
        feedback_handler::acknowledge_feedback,
        feedback_handler::list_received,
        feedback_handler::list_given,
        feedback_handler::team_history,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserSummary,
            UserResponse,
            Sentiment,
            GiverInfo,
            FeedbackResponse,
            // Request/response types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            MessageResponse,
            user_handler::ManagerResponse,
            feedback_handler::CreateFeedbackRequest,
            feedback_handler::UpdateFeedbackRequest,
            feedback_handler::AcknowledgeRequest,
            feedback_handler::AcknowledgeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and sessions"),
        (name = "Users", description = "Directory and team relationships"),
        (name = "Feedback", description = "Giving, editing and acknowledging feedback")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token from /api/auth/login (also sent as the access_token cookie)",
                        ))
                        .build(),
                ),
            );
        }
    }
}
