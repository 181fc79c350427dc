use base64::Engine;
use reqwest::Client;

use parley_provider::{ContentItem, ProviderProfile};
use parley_types::MessageRole;

const FETCH_TIMEOUT_SECS: u64 = 30;

/// Fetches attachment bytes from addressable storage and classifies them
/// into wire content items. Failures resolve to `None` so one bad
/// attachment never sinks the message build.
pub struct AttachmentResolver {
    client: Client,
}

impl AttachmentResolver {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    pub async fn resolve(
        &self,
        url: &str,
        declared_mime: &str,
        profile: &ProviderProfile,
        role: MessageRole,
    ) -> Option<ContentItem> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "attachment fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(url = %url, status = %response.status(), "attachment fetch rejected");
            return None;
        }

        // The storage layer's content-type wins over whatever the client
        // declared at upload time.
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| declared_mime.to_string());

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "attachment body read failed");
                return None;
            }
        };
        let data = base64::engine::general_purpose::STANDARD.encode(&bytes);

        classify(data, &mime, profile, role, url)
    }
}

impl Default for AttachmentResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn filename_from_url(url: &str) -> Option<String> {
    url.rsplit('/')
        .next()
        .map(|name| name.split('?').next().unwrap_or(name))
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
}

fn classify(
    data: String,
    mime: &str,
    profile: &ProviderProfile,
    role: MessageRole,
    url: &str,
) -> Option<ContentItem> {
    if mime.starts_with("image/") {
        // User images go over as proper image content; an image inside an
        // assistant turn is plain file content in every provider dialect.
        if role == MessageRole::User {
            return Some(ContentItem::Image {
                image: format!("data:{};base64,{}", mime, data),
                mime_type: Some(mime.to_string()),
            });
        }
        return Some(ContentItem::File {
            data,
            mime_type: mime.to_string(),
            filename: filename_from_url(url),
        });
    }

    if mime == "application/pdf" && profile.supports_documents {
        return Some(ContentItem::File {
            data,
            mime_type: mime.to_string(),
            filename: filename_from_url(url),
        });
    }

    if role == MessageRole::Assistant {
        return Some(ContentItem::File {
            data,
            mime_type: mime.to_string(),
            filename: filename_from_url(url),
        });
    }

    tracing::debug!(url = %url, mime = %mime, "omitting unsupported user attachment");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_provider::ProviderRegistry;

    fn profile(id: &str) -> ProviderProfile {
        ProviderRegistry::new().resolve(id)
    }

    #[tokio::test]
    async fn user_image_resolves_to_image_item() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/chart.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(vec![137u8, 80, 78, 71])
            .create_async()
            .await;

        let resolver = AttachmentResolver::new();
        let item = resolver
            .resolve(
                &format!("{}/chart.png", server.url()),
                "image/png",
                &profile("anthropic"),
                MessageRole::User,
            )
            .await;

        mock.assert_async().await;
        match item {
            Some(ContentItem::Image { image, mime_type }) => {
                assert!(image.starts_with("data:image/png;base64,"));
                assert_eq!(mime_type.as_deref(), Some("image/png"));
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[tokio::test]
    async fn assistant_image_resolves_to_file_item() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/render.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(vec![1u8, 2, 3])
            .create_async()
            .await;

        let resolver = AttachmentResolver::new();
        let item = resolver
            .resolve(
                &format!("{}/render.png", server.url()),
                "image/png",
                &profile("anthropic"),
                MessageRole::Assistant,
            )
            .await;

        assert!(matches!(item, Some(ContentItem::File { .. })));
    }

    #[tokio::test]
    async fn pdf_requires_document_support_on_the_user_side() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/report.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4")
            .expect_at_least(1)
            .create_async()
            .await;

        let resolver = AttachmentResolver::new();
        let url = format!("{}/report.pdf", server.url());

        let with_docs = resolver
            .resolve(&url, "application/pdf", &profile("anthropic"), MessageRole::User)
            .await;
        assert!(matches!(with_docs, Some(ContentItem::File { .. })));

        let without_docs = resolver
            .resolve(&url, "application/pdf", &profile("mistral"), MessageRole::User)
            .await;
        assert!(without_docs.is_none());
    }

    #[tokio::test]
    async fn unsupported_user_attachment_is_silently_omitted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/notes.csv")
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body("a,b,c")
            .create_async()
            .await;

        let resolver = AttachmentResolver::new();
        let url = format!("{}/notes.csv", server.url());

        let user_side = resolver
            .resolve(&url, "text/csv", &profile("anthropic"), MessageRole::User)
            .await;
        assert!(user_side.is_none());

        let assistant_side = resolver
            .resolve(&url, "text/csv", &profile("anthropic"), MessageRole::Assistant)
            .await;
        assert!(matches!(assistant_side, Some(ContentItem::File { .. })));
    }

    #[tokio::test]
    async fn http_failure_resolves_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone.png")
            .with_status(404)
            .create_async()
            .await;

        let resolver = AttachmentResolver::new();
        let item = resolver
            .resolve(
                &format!("{}/gone.png", server.url()),
                "image/png",
                &profile("anthropic"),
                MessageRole::User,
            )
            .await;
        assert!(item.is_none());
    }

    #[tokio::test]
    async fn response_content_type_wins_over_declared_mime() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/mystery")
            .with_status(200)
            .with_header("content-type", "image/jpeg; charset=binary")
            .with_body(vec![255u8, 216])
            .create_async()
            .await;

        let resolver = AttachmentResolver::new();
        let item = resolver
            .resolve(
                &format!("{}/mystery", server.url()),
                "application/octet-stream",
                &profile("anthropic"),
                MessageRole::User,
            )
            .await;

        match item {
            Some(ContentItem::Image { mime_type, .. }) => {
                assert_eq!(mime_type.as_deref(), Some("image/jpeg"));
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }
}
