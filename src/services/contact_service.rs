use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    audit::log_audit,
    dto::contacts::{ContactList, ContactListQuery, ContactRequest},
    error::{AppError, AppResult},
    middleware::auth::{SessionUser, ensure_admin},
    models::ContactMessage,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    store::Collection,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewContact<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    read: bool,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ReadChange {
    read: bool,
}

pub async fn submit(
    state: &AppState,
    payload: ContactRequest,
) -> AppResult<ApiResponse<ContactMessage>> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    let subject = payload.subject.trim();
    let message = payload.message.trim();
    if [name, email, subject, message].iter().any(|f| f.is_empty()) {
        return Err(AppError::BadRequest("all fields are required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("email is invalid".into()));
    }

    let contact: ContactMessage = state
        .store
        .create(
            Collection::Contacts,
            &NewContact {
                name,
                email,
                subject,
                message,
                read: false,
                created_at: Utc::now(),
            },
        )
        .await?;

    log_audit(
        None,
        "contact_submit",
        Some("contacts"),
        Some(serde_json::json!({ "contact_id": contact.id })),
    );
    Ok(ApiResponse::success("Message sent", contact, None))
}

pub async fn list_contacts(
    state: &AppState,
    user: &SessionUser,
    query: ContactListQuery,
) -> AppResult<ApiResponse<ContactList>> {
    ensure_admin(user)?;
    let mut messages: Vec<ContactMessage> = state
        .store
        .list::<ContactMessage>(Collection::Contacts)
        .await?
        .into_iter()
        .filter(|m| !query.unread.unwrap_or(false) || !m.read)
        .collect();
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = messages.len() as i64;
    let pagination = Pagination {
        page: query.page,
        per_page: query.per_page,
    };
    let (items, page, per_page) = pagination.apply(messages);
    Ok(ApiResponse::success(
        "Messages",
        ContactList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn mark_read(
    state: &AppState,
    user: &SessionUser,
    id: &str,
) -> AppResult<ApiResponse<ContactMessage>> {
    ensure_admin(user)?;
    let contact: ContactMessage = state
        .store
        .update(Collection::Contacts, id, &ReadChange { read: true })
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Marked as read", contact, None))
}

pub async fn delete_contact(
    state: &AppState,
    user: &SessionUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if !state.store.delete(Collection::Contacts, id).await? {
        return Err(AppError::NotFound);
    }

    log_audit(
        Some(&user.user_id),
        "contact_delete",
        Some("contacts"),
        Some(serde_json::json!({ "contact_id": id })),
    );
    Ok(ApiResponse::success(
        "Message deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
