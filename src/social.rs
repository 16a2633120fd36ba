//! Social preview image URLs.
//!
//! Preview cards are rendered by the image CDN, not by us: the URL itself is
//! the program. It is a chain of `/`-separated transformation segments
//! applied to a background image:
//!
//! ```text
//! {base_url}
//!   /$th_1256,$tw_2400,$gw_$tw_div_24,$gh_$th_div_12      layout variables
//!   /co_white,…,l_text:{font}_110:{title}                  title
//!   /co_rgb:a9adc1,…,l_text:{font}_50:{description}        description (optional)
//!   /co_rgb:a9adc1,…,l_text:{font}_40:{url}                page url
//!   /c_fill,ar_3:4,…,l_fetch:{base64 url} | l_{local:id}   featured image
//!   /c_fill,w_$tw,h_$th/{background}                       background
//! ```
//!
//! Text is percent-encoded twice: the CDN decodes the segment once as a path
//! and once more as layer text. Building the URL makes no network call.

use crate::config::SocialImageConfig;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters `encodeURIComponent` escapes: everything except ASCII
/// alphanumerics and `- _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Canvas 2400×1256, split into a 24×12 grid (`$gw` × `$gh` cells).
const LAYOUT_VARS: &str = "$th_1256,$tw_2400,$gw_$tw_div_24,$gh_$th_div_12";

/// Inputs for one preview card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialImageDescriptor {
    pub title: String,
    pub description: Option<String>,
    /// Remote URL or site-local path; the configured fallback when `None`.
    pub featured_image: Option<String>,
    /// Canonical URL of the page, printed on the card.
    pub url: String,
}

pub fn build_url(config: &SocialImageConfig, image: &SocialImageDescriptor) -> String {
    let font = &config.title_font;
    let mut segments = vec![
        config.base_url.trim_end_matches('/').to_string(),
        LAYOUT_VARS.to_string(),
        format!(
            "co_white,c_fit,g_north_west,w_$gw_mul_10,h_$gh_mul_7,x_$gw_mul_1.3,y_$gh_mul_1.5,l_text:{font}_110:{}",
            double_encode(&image.title)
        ),
    ];

    if let Some(description) = image.description.as_deref()
        && !description.trim().is_empty()
    {
        segments.push(format!(
            "co_rgb:a9adc1,c_fit,g_north_west,w_$gw_mul_10,h_$gh_mul_2,x_$gw_mul_1.3,y_$gh_mul_8.2,l_text:{font}_50:{}",
            double_encode(description)
        ));
    }

    segments.push(format!(
        "co_rgb:a9adc1,c_fit,g_north_west,w_$gw_mul_5.5,h_$gh_mul_4,x_$gw_mul_4.5,y_$gh_mul_9.8,l_text:{font}_40:{}",
        double_encode(&image.url)
    ));

    let featured = image
        .featured_image
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&config.fallback_image);
    segments.push(format!(
        "c_fill,ar_3:4,r_12,g_east,h_$gh_mul_10,x_$gw,{}",
        image_layer(featured)
    ));

    segments.push(format!("c_fill,w_$tw,h_$th/{}", config.background));
    segments.join("/")
}

/// `l_fetch:{base64}` for remote images, `l_{public:id}` for local ones.
fn image_layer(image: &str) -> String {
    if is_remote(image) {
        format!("l_fetch:{}", STANDARD.encode(image))
    } else {
        format!("l_{}", image.trim_start_matches('/').replace('/', ":"))
    }
}

fn is_remote(image: &str) -> bool {
    image.starts_with("http://") || image.starts_with("https://")
}

/// Percent-encode with `encodeURIComponent` semantics.
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

pub fn double_encode(s: &str) -> String {
    encode_uri_component(&encode_uri_component(s))
}
