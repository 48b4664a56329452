use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use extrato_import::{convert, Conversion};
use std::sync::Arc;

use crate::upload::{split_upload, UploadError, UploadForm};
use crate::AppState;

pub const DOWNLOAD_NAME: &str = "convertido.ofx";
pub const NO_TRANSACTIONS_MSG: &str =
    "Nenhuma transação válida foi encontrada no ficheiro para gerar um OFX.";
pub const EMPTY_FILE_MSG: &str =
    "Ficheiro CSV parece estar vazio ou não contém linhas de dados.";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt">
<head>
<meta charset="utf-8">
<title>Conversor CSV para OFX</title>
</head>
<body>
<h1>Conversor CSV para OFX</h1>
<form action="/converter" method="post" enctype="multipart/form-data">
<p><label>Ficheiro CSV <input type="file" name="csv_file" accept=".csv,text/csv" required></label></p>
<p><label>Tipo de conta
<select name="tipo_conta">
<option value="corrente">Conta corrente</option>
<option value="credito">Cartão de crédito</option>
</select></label></p>
<p><label>Delimitador
<select name="delimitador">
<option value=";">Ponto e vírgula (;)</option>
<option value=",">Vírgula (,)</option>
</select></label></p>
<p><label>Formato decimal
<select name="formato_decimal">
<option value="virgula">1.234,56</option>
<option value="ponto">1,234.56</option>
</select></label></p>
<p><label>Ignorar descrições contendo (separadas por vírgula) <input type="text" name="ignorar"></label></p>
<p><button type="submit">Converter</button></p>
</form>
</body>
</html>
"#;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn convert_upload(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    match run_conversion(&state, multipart).await {
        Ok(Conversion::Document(doc)) => {
            tracing::info!(
                transactions = doc.transactions,
                skipped = doc.skipped.len(),
                "serving converted statement"
            );
            (
                [
                    (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
                    ),
                ],
                doc.into_bytes(),
            )
                .into_response()
        }
        Ok(Conversion::Empty { skipped }) => {
            tracing::info!(skipped = skipped.len(), "upload produced no transactions");
            (StatusCode::BAD_REQUEST, Html(NO_TRANSACTIONS_MSG)).into_response()
        }
        Err(UploadError::TooFewLines) => {
            (StatusCode::BAD_REQUEST, Html(EMPTY_FILE_MSG)).into_response()
        }
        Err(e) => {
            tracing::warn!("Conversion failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(error_page(&e.to_string()))).into_response()
        }
    }
}

async fn run_conversion(state: &AppState, multipart: Multipart) -> Result<Conversion, UploadError> {
    let form = UploadForm::from_multipart(multipart).await?;
    let profile = form.profile(&state.settings.defaults)?;
    let bytes = form.file.as_deref().ok_or(UploadError::MissingFile)?;
    let (header, rows) = split_upload(bytes)?;
    Ok(convert(header, &rows, &profile)?)
}

fn error_page(message: &str) -> String {
    format!(
        "Ocorreu um erro: <br><pre>{}</pre>",
        html_escape::encode_text(message)
    )
}
