//! 重定向引擎
//!
//! 组合路由解析、规则匹配、设备识别和决策，对每个请求给出唯一的处理结果。
//! 每个请求最多一次 slug 规则查询和一次页面规则查询，不做后台处理。

use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::models::{Content, RedirectRule};
use crate::redirect::device::{self, DeviceClass};
use crate::redirect::matcher::RuleMatcher;
use crate::redirect::resolver::{self, Action};
use crate::redirect::route;
use crate::server_utils::safe_truncate;
use crate::store::ContentLookup;

/// 日志中 User-Agent 的最大长度
const UA_LOG_LIMIT: usize = 120;

/// 客户端跳转脚本的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptConfig {
    pub ios: String,
    pub android: String,
    pub backup: String,
    /// 当前页面 URL，备用地址与之相同时脚本不跳转
    pub current: String,
}

/// 中间页内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interstitial {
    /// 当前设备对应的商店地址
    pub store_url: String,
    pub backup_url: String,
    pub script: ScriptConfig,
}

/// 请求处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// 站点首页
    Home,
    /// 渲染中间页
    Interstitial(Interstitial),
    /// 服务端跳转
    Redirect { target_url: String },
    /// 渲染站内内容，可能附带跳转脚本
    RenderContent {
        content: Content,
        script: Option<ScriptConfig>,
    },
    NotFound,
}

/// 引擎选项
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub home_url: String,
    pub base_path: String,
    /// Custom 规则无可用地址时跳转首页
    pub home_fallback: bool,
}

#[derive(Clone)]
pub struct RedirectEngine {
    matcher: RuleMatcher,
    content: Arc<dyn ContentLookup>,
    options: EngineOptions,
}

impl RedirectEngine {
    pub fn new(
        matcher: RuleMatcher,
        content: Arc<dyn ContentLookup>,
        options: EngineOptions,
    ) -> Self {
        Self {
            matcher,
            content,
            options,
        }
    }

    /// 处理一次请求
    ///
    /// 先尝试自定义 slug 规则，再尝试页面规则。页面规则从不触发服务端跳转。
    pub fn evaluate(&self, uri: &str, user_agent: &str) -> Result<Decision> {
        let Some(path) = route::extract_request_slug(uri, &self.options.base_path) else {
            return Ok(Decision::Home);
        };

        let device = device::classify(user_agent);
        let route = route::resolve_route(&path, self.content.as_ref())?;

        if let Some(slug_key) = &route.slug_key {
            if let Some(rule) = self.matcher.find(slug_key)? {
                let action = resolver::resolve(&rule, device);
                tracing::debug!(
                    "[REDIRECT] slug={} device={:?} action={:?} ua={}",
                    path,
                    device,
                    action,
                    safe_truncate(user_agent, UA_LOG_LIMIT)
                );
                if let Some(decision) = self.custom_decision(&rule, action) {
                    return Ok(decision);
                }
            }
        }

        let Some(content_ref) = &route.content else {
            return Ok(Decision::NotFound);
        };
        let Some(content) = self.content.get_content(content_ref.id)? else {
            return Ok(Decision::NotFound);
        };

        let script = match route.page_key() {
            Some(page_key) => self
                .matcher
                .find(&page_key)?
                .and_then(|rule| self.page_script(&rule, &content, device, user_agent)),
            None => None,
        };

        Ok(Decision::RenderContent { content, script })
    }

    fn custom_decision(&self, rule: &RedirectRule, action: Action) -> Option<Decision> {
        match action {
            Action::ShowInterstitial {
                store_url,
                backup_url,
            } => Some(Decision::Interstitial(Interstitial {
                store_url,
                backup_url,
                script: script_config(rule, self.url_for(&rule.reference_key)),
            })),
            Action::ServerRedirect { target_url } => Some(Decision::Redirect { target_url }),
            Action::NoAction if self.options.home_fallback => Some(Decision::Redirect {
                target_url: self.options.home_url.clone(),
            }),
            Action::NoAction => None,
        }
    }

    fn page_script(
        &self,
        rule: &RedirectRule,
        content: &Content,
        device: DeviceClass,
        user_agent: &str,
    ) -> Option<ScriptConfig> {
        match resolver::resolve(rule, device) {
            Action::ShowInterstitial { .. } => {
                tracing::debug!(
                    "[REDIRECT] page={} device={:?} 注入跳转脚本 ua={}",
                    rule.reference_key,
                    device,
                    safe_truncate(user_agent, UA_LOG_LIMIT)
                );
                Some(script_config(rule, self.url_for(&content.slug)))
            }
            _ => None,
        }
    }

    fn url_for(&self, path: &str) -> String {
        site_url(&self.options.home_url, path)
    }
}

fn script_config(rule: &RedirectRule, current: String) -> ScriptConfig {
    ScriptConfig {
        ios: rule.ios_url.clone(),
        android: rule.android_url.clone(),
        backup: rule.backup_url.clone(),
        current,
    }
}

/// 拼接站内访问地址
pub fn site_url(home_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        home_url.trim_end_matches('/'),
        path.trim_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{self, dao::ContentDao, DbConnection};
    use crate::models::RuleType;
    use crate::store::{RuleStore, SqliteContentStore, SqliteRuleStore};

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
    const ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8)";
    const DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

    fn engine(home_fallback: bool) -> (RedirectEngine, DbConnection, Arc<SqliteRuleStore>) {
        let db = database::open_in_memory().unwrap();
        let rules = Arc::new(SqliteRuleStore::new(db.clone()));
        let content = Arc::new(SqliteContentStore::new(db.clone()));
        let engine = RedirectEngine::new(
            RuleMatcher::new(rules.clone()),
            content,
            EngineOptions {
                home_url: "https://example.com".to_string(),
                base_path: String::new(),
                home_fallback,
            },
        );
        (engine, db, rules)
    }

    fn custom(key: &str, ios: &str, android: &str, backup: &str) -> RedirectRule {
        let mut rule = RedirectRule::new(RuleType::Custom, key);
        rule.ios_url = ios.to_string();
        rule.android_url = android.to_string();
        rule.backup_url = backup.to_string();
        rule
    }

    #[test]
    fn test_root_is_home() {
        let (engine, _, _) = engine(true);
        assert_eq!(engine.evaluate("/", IPHONE).unwrap(), Decision::Home);
    }

    #[test]
    fn test_custom_interstitial_for_iphone() {
        let (engine, _, rules) = engine(true);
        rules
            .upsert(&custom("promo", "https://apps.apple.com/x", "", ""))
            .unwrap();

        match engine.evaluate("/promo?ref=mail", IPHONE).unwrap() {
            Decision::Interstitial(page) => {
                assert_eq!(page.store_url, "https://apps.apple.com/x");
                assert_eq!(page.script.current, "https://example.com/promo");
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_custom_backup_redirect() {
        let (engine, _, rules) = engine(true);
        rules
            .upsert(&custom("promo", "https://apps.apple.com/x", "", "https://example.org/dl"))
            .unwrap();

        assert_eq!(
            engine.evaluate("/promo", ANDROID).unwrap(),
            Decision::Redirect {
                target_url: "https://example.org/dl".to_string()
            }
        );
    }

    #[test]
    fn test_custom_no_action_falls_back_home() {
        let (engine, _, rules) = engine(true);
        rules
            .upsert(&custom("promo", "https://apps.apple.com/x", "", ""))
            .unwrap();

        assert_eq!(
            engine.evaluate("/promo", DESKTOP).unwrap(),
            Decision::Redirect {
                target_url: "https://example.com".to_string()
            }
        );
    }

    #[test]
    fn test_custom_no_action_without_fallback_is_not_found() {
        let (engine, _, rules) = engine(false);
        rules
            .upsert(&custom("promo", "https://apps.apple.com/x", "", ""))
            .unwrap();

        assert_eq!(engine.evaluate("/promo", DESKTOP).unwrap(), Decision::NotFound);
    }

    #[test]
    fn test_disabled_rule_is_ignored() {
        let (engine, _, rules) = engine(true);
        let mut rule = custom("promo", "https://apps.apple.com/x", "", "https://example.org");
        rule.enabled = false;
        rules.upsert(&rule).unwrap();

        assert_eq!(engine.evaluate("/promo", IPHONE).unwrap(), Decision::NotFound);
    }

    #[test]
    fn test_page_rule_injects_script_and_never_redirects() {
        let (engine, db, rules) = engine(true);
        let id = {
            let conn = db.lock().unwrap();
            ContentDao::insert(&conn, "page", "app", "Our App", "<p>hi</p>", 0).unwrap()
        };
        let mut rule = RedirectRule::new(RuleType::Page, &id.to_string());
        rule.ios_url = "https://apps.apple.com/x".to_string();
        rule.backup_url = "https://example.org/dl".to_string();
        rules.upsert(&rule).unwrap();

        match engine.evaluate("/app", IPHONE).unwrap() {
            Decision::RenderContent { content, script } => {
                assert_eq!(content.id, id);
                let script = script.unwrap();
                assert_eq!(script.ios, "https://apps.apple.com/x");
                assert_eq!(script.current, "https://example.com/app");
            }
            other => panic!("unexpected decision: {:?}", other),
        }

        match engine.evaluate("/app", DESKTOP).unwrap() {
            Decision::RenderContent { script, .. } => assert!(script.is_none()),
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let (engine, _, _) = engine(true);
        assert_eq!(engine.evaluate("/nothing", IPHONE).unwrap(), Decision::NotFound);
    }

    #[test]
    fn test_site_url_joins_home() {
        assert_eq!(
            site_url("https://example.com/", "/promo/"),
            "https://example.com/promo"
        );
    }
}
