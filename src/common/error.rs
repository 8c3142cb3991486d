use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

// O tipo de erro central da aplicação, com `thiserror` para ergonomia.
// As mensagens visíveis ao usuário ficam em vietnamita (idioma do centro);
// a mensagem do variant é o que o front-end exibe no toast.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Tên đăng nhập hoặc mật khẩu không đúng!")]
    InvalidCredentials,

    #[error("Phiên đăng nhập không hợp lệ hoặc đã hết hạn. Vui lòng đăng nhập lại!")]
    InvalidToken,

    #[error("Bạn không có quyền thực hiện thao tác này!")]
    Forbidden,

    #[error("Không tìm thấy nhân viên!")]
    UserNotFound,

    #[error("Tên đăng nhập này đã tồn tại trong danh sách nhân viên!")]
    UsernameTaken,

    // Check-in com uma sessão ainda aberta; carrega o início dela.
    #[error("Bạn đang có ca làm việc chưa kết thúc (bắt đầu lúc {started_at})! Vui lòng Check-out hoặc Xóa ca cũ.")]
    AlreadyOpenSession { started_at: String },

    #[error("Bạn chưa vào ca hoặc đã ra ca rồi!")]
    NoOpenSession,

    // Rejeição pela lista de IPs permitidos. Estrita: não há retry.
    #[error("IP Mạng không hợp lệ ({ip}). Vui lòng kết nối Wifi công ty!")]
    ForbiddenNetwork { ip: String },

    #[error("Không tìm thấy phiên làm việc!")]
    RecordNotFound,

    #[error("Không tìm thấy phiên này!")]
    SessionNotFound,

    #[error("Lớp học không còn tồn tại!")]
    ClassNotFound,

    #[error("Đã hết giờ học! Không thể nhận lớp sau khi ca dạy đã kết thúc.")]
    ClassEnded,

    #[error("Bạn chưa được cấu hình Vai trò (Role). Vui lòng liên hệ Admin!")]
    RoleNotConfigured,

    // A varredura confirmada pelo admin não bate mais com o banco.
    #[error("Dữ liệu đã thay đổi kể từ lần quét trước. Vui lòng quét lại trước khi xóa!")]
    StaleScan,

    #[error("Dữ liệu gửi lên không hợp lệ: {0}")]
    BadRequest(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Constrói AlreadyOpenSession formatando o início da sessão aberta no
    // fuso local configurado, como o usuário espera ler no toast.
    pub fn already_open(started_at: DateTime<Utc>, offset: chrono::FixedOffset) -> Self {
        Self::AlreadyOpenSession {
            started_at: started_at
                .with_timezone(&offset)
                .format("%H:%M:%S")
                .to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Một hoặc nhiều trường dữ liệu không hợp lệ.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::ForbiddenNetwork { .. } => (StatusCode::FORBIDDEN, self.to_string()),

            AppError::UserNotFound
            | AppError::RecordNotFound
            | AppError::SessionNotFound
            | AppError::ClassNotFound => (StatusCode::NOT_FOUND, self.to_string()),

            AppError::UsernameTaken | AppError::StaleScan => {
                (StatusCode::CONFLICT, self.to_string())
            }

            AppError::AlreadyOpenSession { .. }
            | AppError::NoOpenSession
            | AppError::ClassEnded
            | AppError::RoleNotConfigured => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),

            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),

            // Todos os outros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a causa detalhada; o cliente recebe algo genérico.
            e => {
                tracing::error!("Erro interno do servidor: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Đã xảy ra lỗi hệ thống. Vui lòng thử lại sau!".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
