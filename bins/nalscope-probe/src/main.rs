//! nalscope-probe - 码流参数集探测工具
//!
//! 对标 ffprobe 的参数集视图: 读取 H.264/H.265 Annex B 码流或 avcC/hvcC 配置记录,
//! 输出 NAL 头部与 VPS/SPS/PPS 摘要; 或者解析 MIME codecs 参数中的 codec 字符串.

mod report;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;
use std::process;

use nalscope::logging::{self, LoggingConfig};
use nalscope_codec::codec_string::parse_codec_string;
use nalscope_codec::parsers::h264::{parse_avc_annexb, parse_avc_description};
use nalscope_codec::parsers::h265::{parse_hevc_annexb, parse_hevc_description};

use report::{CodecStringReport, ProbeOutput, StreamReport};

/// nalscope 码流参数集探测工具
#[derive(Parser, Debug)]
#[command(name = "nalscope-probe", version, about = "纯 Rust 视频码流参数集探测工具")]
struct Cli {
    /// 输入文件路径
    input: Option<PathBuf>,

    /// 码流编码格式
    #[arg(long, value_enum, default_value_t = CodecArg::H264)]
    codec: CodecArg,

    /// 输入数据布局: Annex B 字节流或 avcC/hvcC 配置记录
    #[arg(long, value_enum, default_value_t = LayoutArg::Annexb)]
    layout: LayoutArg,

    /// 解析 codec 字符串 (如 avc1.42E01E)
    #[arg(long)]
    codec_string: Option<String>,

    /// 列出每个 NAL 单元
    #[arg(long)]
    show_nal_units: bool,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 静默模式 (只输出探测结果)
    #[arg(short, long)]
    quiet: bool,

    /// 日志详细程度 (-v=debug, -vv=trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 日志目录
    #[arg(long, default_value = "logs")]
    log_dir: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CodecArg {
    H264,
    H265,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    Annexb,
    Config,
}

fn main() {
    let cli = Cli::parse();

    if cli.input.is_none() && cli.codec_string.is_none() {
        print_banner();
        return;
    }

    let config = LoggingConfig {
        directory: cli.log_dir.clone(),
        file_prefix: "nalscope-probe".to_string(),
        console: cli.verbose > 0 && !cli.quiet,
        ..LoggingConfig::default()
    }
    .with_verbosity(cli.verbose);
    if let Err(err) = logging::init(config) {
        eprintln!("警告: 日志系统初始化失败: {err:#}");
    }

    if let Err(err) = run(&cli) {
        eprintln!("错误: {err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut output = ProbeOutput::default();

    if let Some(ref codec_string) = cli.codec_string {
        let params = parse_codec_string(codec_string)
            .with_context(|| format!("无法解析 codec 字符串 '{codec_string}'"))?;
        debug!("codec 字符串解析完成: {params}");
        output.codec_string = Some(CodecStringReport::new(codec_string, &params));
    }

    if let Some(ref input) = cli.input {
        if !cli.quiet {
            eprintln!(
                "nalscope-probe 版本 {} -- 纯 Rust 码流参数集探测工具",
                nalscope::version()
            );
            eprintln!("输入文件: {}", input.display());
        }
        let data = std::fs::read(input)
            .with_context(|| format!("无法读取文件 '{}'", input.display()))?;
        info!("读取输入文件: {}, {} 字节", input.display(), data.len());
        output.stream = Some(probe_stream(cli, &input.to_string_lossy(), &data)?);
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("JSON 序列化失败")?;
        println!("{json}");
    } else {
        if let Some(ref report) = output.codec_string {
            report::print_codec_string_text(report);
        }
        if let Some(ref report) = output.stream {
            report::print_stream_text(report, cli.show_nal_units);
        }
    }

    Ok(())
}

/// 按编码格式与布局选择聚合器
fn probe_stream(cli: &Cli, filename: &str, data: &[u8]) -> Result<StreamReport> {
    let report = match (cli.codec, cli.layout) {
        (CodecArg::H264, LayoutArg::Annexb) => {
            StreamReport::from_avc_annexb(filename, &parse_avc_annexb(data))
        }
        (CodecArg::H264, LayoutArg::Config) => {
            let info = parse_avc_description(data).context("avcC 配置记录无效")?;
            StreamReport::from_avc_description(filename, &info)
        }
        (CodecArg::H265, LayoutArg::Annexb) => {
            StreamReport::from_hevc_annexb(filename, &parse_hevc_annexb(data))
        }
        (CodecArg::H265, LayoutArg::Config) => {
            let info = parse_hevc_description(data).context("hvcC 配置记录无效")?;
            StreamReport::from_hevc_description(filename, &info)
        }
    };

    if report.nb_nal_units == 0 {
        bail!("未找到任何 NAL 单元, 请确认 --codec 与 --layout 是否正确");
    }
    Ok(report)
}

/// 打印版本横幅
fn print_banner() {
    println!(
        "nalscope-probe 版本 {} -- 纯 Rust 码流参数集探测工具",
        nalscope::version()
    );
    println!();
    println!("用法: nalscope-probe [选项] <输入文件>");
    println!("      nalscope-probe --codec-string <字符串>");
    println!();
    println!("选项:");
    println!("  --codec <h264|h265>         码流编码格式 (默认 h264)");
    println!("  --layout <annexb|config>    输入数据布局 (默认 annexb)");
    println!("  --codec-string <字符串>     解析 codec 字符串");
    println!("  --show-nal-units            列出每个 NAL 单元");
    println!("  --json                      以 JSON 格式输出");
    println!("  -q, --quiet                 静默模式");
    println!("  -v, -vv                     提升日志级别");
    println!();
    println!("使用 --help 查看完整用法.");
}
