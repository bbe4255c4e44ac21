//! HTML 模板
//!
//! 中间页、站内内容页、首页和 404 页面。所有动态内容都经过转义，
//! 跳转配置以 JSON 形式嵌入脚本。

use crate::models::Content;
use crate::redirect::{Interstitial, ScriptConfig};
use crate::server_utils::{escape_html, json_for_script};

/// 客户端跳转脚本
///
/// iOS/Android 设备跳转到对应商店；其他设备在备用地址与当前地址不同时跳转到备用地址。
const REDIRECT_SCRIPT: &str = r#"(function () {
  var config = window.deviceRedirectConfig;
  if (!config) { return; }
  var ua = navigator.userAgent || navigator.vendor || "";
  if (/iPad|iPhone|iPod/.test(ua) && !window.MSStream) {
    if (config.ios) { window.location.replace(config.ios); }
  } else if (/android/i.test(ua)) {
    if (config.android) { window.location.replace(config.android); }
  } else if (config.backup && config.backup !== config.current) {
    window.location.replace(config.backup);
  }
})();"#;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;padding:2rem;color:#222}\
.redirect-container{display:flex;align-items:center;justify-content:center;min-height:80vh}\
.redirect-message{text-align:center}\
.redirect-spinner{width:40px;height:40px;margin:0 auto 1rem;border:4px solid #ddd;\
border-top-color:#2271b1;border-radius:50%;animation:spin 1s linear infinite}\
@keyframes spin{to{transform:rotate(360deg)}}\
.home-button{display:inline-block;margin-top:1rem;padding:.5rem 1rem;background:#2271b1;\
color:#fff;text-decoration:none;border-radius:4px}";

fn layout(title: &str, body: &str, script: Option<&ScriptConfig>) -> String {
    let script_tag = script
        .map(|config| {
            format!(
                "<script>window.deviceRedirectConfig = {};</script>\n<script>{}</script>\n",
                json_for_script(config),
                REDIRECT_SCRIPT
            )
        })
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n{}</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body,
        script_tag
    )
}

/// 跳转中间页
pub fn render_interstitial(page: &Interstitial, home_url: &str) -> String {
    let body = format!(
        "<div class=\"redirect-container\">\n<div class=\"redirect-message\">\n\
         <div class=\"redirect-spinner\"></div>\n<h2>Redirecting to store...</h2>\n\
         <noscript><a href=\"{}\">Open in store</a></noscript>\n\
         <a href=\"{}\" class=\"home-button\">Go to Home Page</a>\n</div>\n</div>",
        escape_html(&page.store_url),
        escape_html(home_url)
    );
    layout("Redirecting...", &body, Some(&page.script))
}

/// 站内内容页，可附带跳转脚本
pub fn render_content(content: &Content, script: Option<&ScriptConfig>) -> String {
    let body = format!(
        "<article class=\"{}\">\n<h1>{}</h1>\n<div class=\"content\">{}</div>\n</article>",
        escape_html(&content.content_type),
        escape_html(&content.title),
        escape_html(&content.body)
    );
    layout(&content.title, &body, script)
}

pub fn render_home(home_url: &str) -> String {
    let body = format!(
        "<h1>Home</h1>\n<p><a href=\"{}\">{}</a></p>",
        escape_html(home_url),
        escape_html(home_url)
    );
    layout("Home", &body, None)
}

pub fn render_not_found(home_url: &str) -> String {
    let body = format!(
        "<h1>Page not found</h1>\n<a href=\"{}\" class=\"home-button\">Go to Home Page</a>",
        escape_html(home_url)
    );
    layout("Not Found", &body, None)
}
