use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tunnel-embed")]
#[command(author, version, about = "Check and template run files for an embedded reverse tunnel client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 日志详细程度（-v info, -vv debug, -vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 检查运行文件并显示转换后的代理配置
    Check {
        /// 运行文件路径
        #[arg(short, long, default_value = "tunnel.toml")]
        config: String,

        /// 输出格式
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// 生成示例运行文件
    Template {
        /// 输出文件路径（缺省输出到标准输出）
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    /// 根据 -v 次数得到日志过滤级别
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
