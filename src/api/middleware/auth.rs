use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{api::state::AppState, auth::CurrentUser};

/// Session token presented by the browser, if any.
#[derive(Clone)]
pub struct SessionToken(pub Option<String>);

/// Admin pages: no session sends the browser to the login form, remembering
/// where it was headed.
pub async fn require_session_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
    OriginalUri(original_uri): OriginalUri,
    mut request: Request,
    next: Next,
) -> Response {
    let sessions = &state.service_context.sessions;
    let token = jar.get(sessions.cookie_name()).map(|c| c.value().to_string());

    let Some(user) = sessions.current_user(token.as_deref()).await else {
        let next_path = original_uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| state.link("/admin"));
        let login = format!(
            "{}?next={}",
            state.link("/admin/login"),
            urlencoding::encode(&next_path)
        );
        return Redirect::to(&login).into_response();
    };

    request.extensions_mut().insert::<CurrentUser>(user);
    request.extensions_mut().insert(SessionToken(token));

    next.run(request).await
}
