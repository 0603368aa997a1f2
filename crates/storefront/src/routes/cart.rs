//! Cart route handlers.
//!
//! The cart API takes form posts with an `accion` field and always answers
//! with the JSON envelope carrying the authoritative cart. The cart key is
//! kept in the session and assigned on the first change.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use cafe_aroma_core::{ApiResponse, CartAction, CartKey, CartLineId, StoredCartLine, UnitPrice};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{current_cart_key, ensure_cart_key};
use crate::render::{CartItemsTemplate, CartShowTemplate, CartView};
use crate::state::AppState;

pub(crate) const ADDED_MESSAGE: &str = "Producto añadido al carrito.";
pub(crate) const UPDATED_MESSAGE: &str = "Carrito actualizado.";
pub(crate) const REMOVED_MESSAGE: &str = "Producto eliminado.";
pub(crate) const CLEARED_MESSAGE: &str = "Carrito vaciado.";
pub(crate) const READ_MESSAGE: &str = "Carrito cargado.";

/// Cart API form data.
///
/// Every field is optional at the decoding stage so that missing or
/// malformed values are reported in the envelope rather than by the
/// extractor.
#[derive(Debug, Default, Deserialize)]
pub struct CartActionForm {
    pub accion: Option<String>,
    pub nombre: Option<String>,
    pub precio: Option<String>,
    pub cantidad: Option<String>,
    pub id: Option<String>,
}

/// Cart API query string.
#[derive(Debug, Default, Deserialize)]
pub struct CartQuery {
    pub accion: Option<String>,
}

/// A fully parsed cart API request.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CartRequest {
    Add {
        name: String,
        unit_price: UnitPrice,
        quantity: u32,
    },
    Read,
    Update {
        id: CartLineId,
        quantity: u32,
    },
    Remove {
        id: CartLineId,
    },
    Clear,
}

fn parse_action(value: Option<&str>) -> Result<CartAction> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("Acción no especificada.".to_string()))?;

    match value {
        "agregar" => Ok(CartAction::Agregar),
        "leer" => Ok(CartAction::Leer),
        "actualizar" => Ok(CartAction::Actualizar),
        "eliminar" => Ok(CartAction::Eliminar),
        "vaciar" => Ok(CartAction::Vaciar),
        _ => Err(AppError::BadRequest("Acción no válida.".to_string())),
    }
}

fn parse_quantity(value: Option<&str>, default: Option<u32>) -> Result<u32> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| AppError::Validation("Cantidad no válida.".to_string())),
        None => default.ok_or_else(|| AppError::Validation("Cantidad no válida.".to_string())),
    }
}

fn parse_line_id(value: Option<&str>) -> Result<CartLineId> {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<i32>().ok())
        .map(CartLineId::new)
        .ok_or_else(|| AppError::BadRequest("Identificador de producto no válido.".to_string()))
}

impl TryFrom<&CartActionForm> for CartRequest {
    type Error = AppError;

    fn try_from(form: &CartActionForm) -> Result<Self> {
        match parse_action(form.accion.as_deref())? {
            CartAction::Agregar => {
                let name = form.nombre.as_deref().map(str::trim).unwrap_or_default();
                if name.is_empty() {
                    return Err(AppError::Validation(
                        "El nombre del producto es obligatorio.".to_string(),
                    ));
                }
                let unit_price = UnitPrice::parse(form.precio.as_deref().unwrap_or_default())
                    .map_err(|_| AppError::Validation("Precio no válido.".to_string()))?;
                let quantity = parse_quantity(form.cantidad.as_deref(), Some(1))?;

                Ok(Self::Add {
                    name: name.to_owned(),
                    unit_price,
                    quantity,
                })
            }
            CartAction::Leer => Ok(Self::Read),
            CartAction::Actualizar => Ok(Self::Update {
                id: parse_line_id(form.id.as_deref())?,
                quantity: parse_quantity(form.cantidad.as_deref(), None)?,
            }),
            CartAction::Eliminar => Ok(Self::Remove {
                id: parse_line_id(form.id.as_deref())?,
            }),
            CartAction::Vaciar => Ok(Self::Clear),
        }
    }
}

async fn stored_lines(state: &AppState, key: Option<CartKey>) -> Result<Vec<StoredCartLine>> {
    match key {
        Some(key) => Ok(state.carts().lines(key).await?),
        None => Ok(Vec::new()),
    }
}

/// Read the cart.
///
/// GET /api/carrito?accion=leer
#[instrument(skip(state, session))]
pub async fn read(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CartQuery>,
) -> Result<Json<ApiResponse>> {
    if let Some(accion) = query.accion.as_deref()
        && parse_action(Some(accion))? != CartAction::Leer
    {
        return Err(AppError::BadRequest(
            "Usa POST para modificar el carrito.".to_string(),
        ));
    }

    let lines = stored_lines(&state, current_cart_key(&session).await?).await?;
    Ok(Json(ApiResponse::ok(READ_MESSAGE).with_cart(lines)))
}

/// Apply a cart action.
///
/// POST /api/carrito
#[instrument(skip(state, session, form), fields(accion = form.accion.as_deref().unwrap_or("")))]
pub async fn mutate(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartActionForm>,
) -> Result<Json<ApiResponse>> {
    let request = CartRequest::try_from(&form)?;
    let carts = state.carts();

    let response = match request {
        CartRequest::Read => {
            let lines = stored_lines(&state, current_cart_key(&session).await?).await?;
            ApiResponse::ok(READ_MESSAGE).with_cart(lines)
        }
        CartRequest::Add {
            name,
            unit_price,
            quantity,
        } => {
            let key = ensure_cart_key(&session).await?;
            let lines = carts.add(key, &name, unit_price, quantity).await?;
            add_breadcrumb("cart", "Added to cart", Some(&[("nombre", name.as_str())]));
            tracing::info!(cart_key = %key, nombre = %name, quantity, "Added to cart");
            ApiResponse::ok(ADDED_MESSAGE).with_cart(lines)
        }
        CartRequest::Update { id, quantity } => {
            let Some(key) = current_cart_key(&session).await? else {
                return Err(AppError::NotFound(
                    "Producto no encontrado en el carrito.".to_string(),
                ));
            };
            let lines = carts.set_quantity(key, id, quantity).await?;
            ApiResponse::ok(UPDATED_MESSAGE).with_cart(lines)
        }
        CartRequest::Remove { id } => {
            let lines = match current_cart_key(&session).await? {
                Some(key) => carts.remove(key, id).await?,
                None => Vec::new(),
            };
            ApiResponse::ok(REMOVED_MESSAGE).with_cart(lines)
        }
        CartRequest::Clear => {
            if let Some(key) = current_cart_key(&session).await? {
                carts.clear(key).await?;
                add_breadcrumb("cart", "Cleared cart", None);
            }
            ApiResponse::ok(CLEARED_MESSAGE).with_cart(Vec::new())
        }
    };

    Ok(Json(response))
}

/// Display the cart page.
///
/// GET /carrito
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let lines = stored_lines(&state, current_cart_key(&session).await?).await?;

    Ok(CartShowTemplate {
        cart: CartView::from(lines.as_slice()),
        shop_name: state.config().shop.name.clone(),
    })
}

/// Cart items fragment.
///
/// GET /carrito/items
#[instrument(skip(state, session))]
pub async fn items(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let lines = stored_lines(&state, current_cart_key(&session).await?).await?;

    Ok(CartItemsTemplate {
        cart: CartView::from(lines.as_slice()),
    })
}
