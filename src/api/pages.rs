use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const DOWNLOAD_HTML: &str = include_str!("../../static/download.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn download_page() -> Html<&'static str> {
    Html(DOWNLOAD_HTML)
}
