//! WordPress XML-RPC client.

use std::time::Duration;

use mp_config::SiteConfig;
use tracing::{debug, info};
use ureq::Agent;

use crate::api::BlogApi;
use crate::error::ApiError;
use crate::types::{MediaUpload, Post, PostContent, PostFilter, Term, UploadedFile};
use crate::xmlrpc::{Value, encode_call, parse_response};

/// Taxonomy used for categories.
const CATEGORY_TAXONOMY: &str = "category";

/// Sync XML-RPC client for one WordPress site.
pub struct WordPressClient {
    agent: Agent,
    endpoint: String,
    blog_id: u32,
    user: String,
    password: String,
}

impl WordPressClient {
    /// Create client from a selected site configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Proxy`] if the configured proxy URL is invalid.
    pub fn from_site(site: &SiteConfig) -> Result<Self, ApiError> {
        let proxy = site
            .proxy
            .as_deref()
            .map(|url| {
                ureq::Proxy::new(url).map_err(|e| ApiError::Proxy {
                    url: url.to_owned(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(site.timeout)))
            .http_status_as_error(false)
            .proxy(proxy)
            .build()
            .into();

        Ok(Self {
            agent,
            endpoint: xmlrpc_endpoint(&site.url),
            blog_id: site.blog_id,
            user: site.user.clone(),
            password: site.password.clone(),
        })
    }

    /// XML-RPC endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call a `wp.*` method. Blog id and credentials are prepended to
    /// `params`.
    fn call_wp(&self, method: &str, params: Vec<Value>) -> Result<Value, ApiError> {
        let mut all = Vec::with_capacity(params.len() + 3);
        all.push(Value::from(self.blog_id));
        all.push(Value::from(self.user.as_str()));
        all.push(Value::from(self.password.as_str()));
        all.extend(params);
        self.call(method, &all)
    }

    /// Perform one XML-RPC call.
    pub fn call(&self, method: &str, params: &[Value]) -> Result<Value, ApiError> {
        debug!("XML-RPC {} -> {}", method, self.endpoint);
        let body = encode_call(method, params);

        let response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("Accept", "text/xml")
            .send(body.as_bytes())?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ApiError::HttpResponse {
                status,
                body: error_body,
            });
        }

        let text = body_reader.read_to_string()?;
        parse_response(&text)
    }
}

impl BlogApi for WordPressClient {
    fn new_post(&self, content: &PostContent) -> Result<String, ApiError> {
        info!("Creating {}", content.post_type.as_deref().unwrap_or("post"));
        let value = self.call_wp("wp.newPost", vec![content.to_value()])?;
        value
            .as_id()
            .ok_or_else(|| ApiError::Malformed("wp.newPost returned no id".to_owned()))
    }

    fn edit_post(&self, id: &str, content: &PostContent) -> Result<bool, ApiError> {
        info!("Updating post {}", id);
        let value = self.call_wp("wp.editPost", vec![post_id(id), content.to_value()])?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn get_post(&self, id: &str) -> Result<Post, ApiError> {
        debug!("Fetching post {}", id);
        let value = self.call_wp("wp.getPost", vec![post_id(id)])?;
        Post::from_value(&value)
    }

    fn get_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ApiError> {
        let value = self.call_wp("wp.getPosts", vec![filter.to_value()])?;
        value
            .as_array()
            .ok_or_else(|| ApiError::Malformed("wp.getPosts did not return an array".to_owned()))?
            .iter()
            .map(Post::from_value)
            .collect()
    }

    fn delete_post(&self, id: &str) -> Result<bool, ApiError> {
        info!("Deleting post {}", id);
        let value = self.call_wp("wp.deletePost", vec![post_id(id)])?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn get_categories(&self) -> Result<Vec<Term>, ApiError> {
        let value = self.call_wp("wp.getTerms", vec![Value::from(CATEGORY_TAXONOMY)])?;
        value
            .as_array()
            .ok_or_else(|| ApiError::Malformed("wp.getTerms did not return an array".to_owned()))?
            .iter()
            .map(Term::from_value)
            .collect()
    }

    fn new_category(&self, name: &str) -> Result<String, ApiError> {
        info!("Creating category '{}'", name);
        let term = Value::structure([
            ("name", Value::from(name)),
            ("taxonomy", Value::from(CATEGORY_TAXONOMY)),
        ]);
        let value = self.call_wp("wp.newTerm", vec![term])?;
        value
            .as_id()
            .ok_or_else(|| ApiError::Malformed("wp.newTerm returned no id".to_owned()))
    }

    fn upload_file(&self, upload: &MediaUpload) -> Result<UploadedFile, ApiError> {
        info!("Uploading '{}' ({} bytes)", upload.name, upload.bits.len());
        let value = self.call_wp("wp.uploadFile", vec![upload.to_value()])?;
        UploadedFile::from_value(&value)
    }
}

/// Post ids are numeric on the wire when possible.
fn post_id(id: &str) -> Value {
    id.parse::<i64>()
        .map_or_else(|_| Value::from(id), Value::Int)
}

/// Derive the XML-RPC endpoint from a site URL.
///
/// Adds `http://` when the URL has no scheme and appends `/xmlrpc.php`
/// unless it is already there.
#[must_use]
pub fn xmlrpc_endpoint(url: &str) -> String {
    let url = url.trim();
    let mut endpoint = if url.contains("://") {
        url.to_owned()
    } else {
        format!("http://{url}")
    };
    if !endpoint.ends_with("/xmlrpc.php") {
        endpoint = format!("{}/xmlrpc.php", endpoint.trim_end_matches('/'));
    }
    endpoint
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_config::RenderConfig;
    use pretty_assertions::assert_eq;

    fn site(url: &str, proxy: Option<&str>) -> SiteConfig {
        SiteConfig {
            name: "default".to_owned(),
            url: url.to_owned(),
            user: "editor".to_owned(),
            password: "secret".to_owned(),
            blog_id: 0,
            proxy: proxy.map(ToOwned::to_owned),
            timeout: 5,
            render: RenderConfig::default(),
        }
    }

    #[test]
    fn test_xmlrpc_endpoint() {
        assert_eq!(
            xmlrpc_endpoint("blog.example.com"),
            "http://blog.example.com/xmlrpc.php"
        );
        assert_eq!(
            xmlrpc_endpoint("https://blog.example.com/"),
            "https://blog.example.com/xmlrpc.php"
        );
        assert_eq!(
            xmlrpc_endpoint("https://blog.example.com/wp/xmlrpc.php"),
            "https://blog.example.com/wp/xmlrpc.php"
        );
    }

    #[test]
    fn test_from_site() {
        let client = WordPressClient::from_site(&site("blog.example.com", None)).unwrap();
        assert_eq!(client.endpoint(), "http://blog.example.com/xmlrpc.php");
    }

    #[test]
    fn test_from_site_with_proxy() {
        let client =
            WordPressClient::from_site(&site("blog.example.com", Some("socks5://127.0.0.1:1080")));
        assert!(client.is_ok());
    }

    #[test]
    fn test_post_id_numeric() {
        assert_eq!(post_id("42"), Value::Int(42));
        assert_eq!(post_id("abc"), Value::from("abc"));
    }
}
