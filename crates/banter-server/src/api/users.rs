//! Current-user handlers.

use axum::{Extension, Json};
use banter_models::UserProfile;

use crate::auth::CurrentUser;

// GET /users/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}
