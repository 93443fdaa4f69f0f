use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

use crate::config::{Config, RunFile};
use crate::engine::{HttpProxyConf, ProxyConf};
use crate::logging::LogSelection;
use crate::runner::client_conf;
use crate::translate::translate_all;

#[derive(Serialize)]
struct CheckResult {
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    details: serde_json::Value,
}

/// 检查结果详情
struct Inspection {
    warnings: Vec<String>,
    proxies: BTreeMap<String, ProxyConf>,
    details: serde_json::Value,
}

/// 验证运行文件并生成将交给引擎的配置
fn inspect(file: &RunFile) -> Result<Inspection> {
    let config = Config::from_options(file.options());
    config.validate()?;

    let client = client_conf(&file.server_addr, &file.token, config.server_port());
    let proxies = translate_all(config.proxies())?;

    let mut warnings = Vec::new();
    if file.token.is_empty() {
        warnings.push("token is empty, the relay server will likely reject the login".to_string());
    }
    if proxies.is_empty() {
        warnings.push("no proxies defined, nothing will be exposed".to_string());
    }

    let log = match config.log_selection() {
        LogSelection::Adapter { name, args } => json!({ "adapter": name, "args": args }),
        _ => json!("engine default"),
    };

    let details = json!({
        "server": client,
        "token_length": file.token.len(),
        "graceful_close_secs": config.graceful_close().as_secs_f64(),
        "log": log,
        "proxies": &proxies,
    });

    Ok(Inspection {
        warnings,
        proxies,
        details,
    })
}

fn proxy_line(http: &HttpProxyConf) -> String {
    format!(
        "Proxy '{}': {} -> {}:{} (encryption: {}, compression: {})",
        http.base.proxy_name,
        http.subdomain,
        http.base.local_ip,
        http.base.local_port,
        http.base.use_encryption,
        http.base.use_compression
    )
}

/// Check run file format
pub fn check_run_file(config_path: &str, format: &str) -> Result<()> {
    let loaded = RunFile::from_file(config_path)
        .map_err(anyhow::Error::from)
        .and_then(|file| inspect(&file).map(|inspection| (file, inspection)));

    let (file, inspection) = match loaded {
        Ok(v) => v,
        Err(e) => {
            if format == "json" {
                let result = CheckResult {
                    valid: false,
                    warnings: vec![],
                    error: Some(format!("{:#}", e)),
                    details: json!({}),
                };
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("✗ {:#}", e);
            }
            return Err(e);
        }
    };

    if format == "json" {
        let result = CheckResult {
            valid: true,
            warnings: inspection.warnings,
            error: None,
            details: inspection.details,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Checking run file: {}\n", config_path);
    println!("✓ Server: {}", file.server_addr);
    println!("✓ Token: {} characters", file.token.len());

    for conf in inspection.proxies.values() {
        if let ProxyConf::Http(http) = conf {
            println!("✓ {}", proxy_line(http));
        }
    }
    for warning in &inspection.warnings {
        println!("⚠ Warning: {}", warning);
    }
    println!("\n✓ Run file is valid!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProxyDescriptor, RUN_FILE_TEMPLATE};
    use crate::error::{ConfigError, ProxyField};

    #[test]
    fn test_inspect_template() {
        let file = RunFile::parse(RUN_FILE_TEMPLATE).unwrap();
        let inspection = inspect(&file).unwrap();

        assert!(inspection.warnings.is_empty());
        let proxy = &inspection.details["proxies"]["web-server"];
        assert_eq!(proxy["type"], "http");
        assert_eq!(proxy["subdomain"], "mysite");
        assert_eq!(proxy["locations"][0], "/");
        assert_eq!(proxy["local_port"], 8080);
        assert_eq!(inspection.details["server"]["server_port"], 7000);
        assert!(inspection.details["server"].get("token").is_none());
    }

    #[test]
    fn test_inspect_warns_on_empty_file() {
        let file = RunFile {
            server_addr: "relay".to_string(),
            token: String::new(),
            server_port: None,
            graceful_close_secs: None,
            log: None,
            proxies: vec![],
        };
        let inspection = inspect(&file).unwrap();
        assert_eq!(inspection.warnings.len(), 2);
    }

    #[test]
    fn test_inspect_rejects_invalid_proxy() {
        let file = RunFile {
            server_addr: "relay".to_string(),
            token: "t".to_string(),
            server_port: None,
            graceful_close_secs: None,
            log: None,
            proxies: vec![ProxyDescriptor::new("web", "mysite", 0)],
        };
        let err = inspect(&file).err().unwrap();
        assert!(err.to_string().contains("local_port"));
    }

    #[test]
    fn test_inspect_reports_missing_port_field() {
        let content = r#"
server_addr = "relay"
token = "t"

[[proxies]]
name = "web"
target_domain = "mysite"
"#;
        let file = RunFile::parse(content).unwrap();
        let err = inspect(&file).err().unwrap();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::InvalidProxy { name, field }) => {
                assert_eq!(name, "web");
                assert_eq!(*field, ProxyField::LocalPort);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_proxy_line_uses_local_ip() {
        let mut http = crate::translate::translate(&ProxyDescriptor::new("web", "mysite", 8080)).unwrap();
        assert_eq!(
            proxy_line(&http),
            "Proxy 'web': mysite -> 127.0.0.1:8080 (encryption: false, compression: false)"
        );

        http.base.local_ip = "10.0.0.5".to_string();
        assert!(proxy_line(&http).contains("-> 10.0.0.5:8080"));
    }

    #[test]
    fn test_check_missing_file() {
        assert!(check_run_file("/nonexistent/tunnel-embed/run.toml", "json").is_err());
    }
}
