//! Book and copy management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookListEntry, BookQuery, CreateBook, UpdateBook},
        book_item::{
            BookItem, BookItemListEntry, BookItemQuery, CreateBookItem, UpdateBookItem,
        },
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List books with search and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<BookListEntry>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookListEntry>>> {
    claims.require_staff()?;

    let (items, total) = state.services.catalog.search_books(&query).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get book details with authors, categories, publisher and copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    claims.require_staff()?;
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Referenced author/category/publisher not found")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_staff()?;
    let book = state.services.catalog.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_staff()?;
    let book = state.services.catalog.update_book(id, request).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has loan history")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List copies across the catalog
#[utoipa::path(
    get,
    path = "/items",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(BookItemQuery),
    responses(
        (status = 200, description = "List of copies", body = PaginatedResponse<BookItemListEntry>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookItemQuery>,
) -> AppResult<Json<PaginatedResponse<BookItemListEntry>>> {
    claims.require_staff()?;

    let (items, total) = state.services.catalog.search_items(&query).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.per_page,
    )))
}

/// Add a copy to a book
#[utoipa::path(
    post,
    path = "/books/{id}/items",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CreateBookItem,
    responses(
        (status = 201, description = "Copy created", body = BookItem),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Barcode already exists")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<CreateBookItem>,
) -> AppResult<(StatusCode, Json<BookItem>)> {
    claims.require_staff()?;
    let item = state.services.catalog.create_item(book_id, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a copy
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    request_body = UpdateBookItem,
    responses(
        (status = 200, description = "Copy updated", body = BookItem),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBookItem>,
) -> AppResult<Json<BookItem>> {
    claims.require_staff()?;
    let item = state.services.catalog.update_item(id, request).await?;
    Ok(Json(item))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy has an open loan")
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
