//! 字符集编解码：`CharBuffer` 与 `ByteBuffer` 之间的转换。
//!
//! # 模块定位（Why）
//! - 码表数据由 `encoding_rs` 承载，本模块只负责按 WHATWG 标签解析字符集名称，
//!   以及把编解码结果落到位置追踪缓冲上。
//!
//! # 契约说明（What）
//! - 未知名称返回 `charset.unsupported`；
//! - 编码时遇到不可映射字符、解码时遇到非法字节序列，均返回 `charset.malformed_input`，
//!   且输入缓冲的游标保持不变；
//! - 输出缓冲总是已 `flip`，可直接读取。

use encoding_rs::Encoding;
use spark_nio_buffer::{ByteBuffer, CharBuffer};
use spark_nio_core::{CharsetConfig, CoreError, Result, codes};
use thiserror::Error;

/// 编解码失败的具体原因，经 `From` 转换为稳定的 [`CoreError`]。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unsupported charset `{name}`")]
    UnsupportedCharset { name: String },
    #[error("charset `{charset}` cannot be used for encoding")]
    EncoderUnavailable { charset: &'static str },
    #[error("character cannot be mapped to `{charset}`")]
    Unmappable { charset: &'static str },
    #[error("malformed `{charset}` input")]
    Malformed { charset: &'static str },
}

impl CodecError {
    /// 对应的稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::UnsupportedCharset { .. } | CodecError::EncoderUnavailable { .. } => {
                codes::CHARSET_UNSUPPORTED
            }
            CodecError::Unmappable { .. } | CodecError::Malformed { .. } => {
                codes::CHARSET_MALFORMED_INPUT
            }
        }
    }
}

impl From<CodecError> for CoreError {
    fn from(err: CodecError) -> Self {
        CoreError::new(err.code(), err.to_string()).with_cause(err)
    }
}

/// 具名字符集。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Charset {
    /// 按名称或别名解析字符集，大小写不敏感（`"GBK"`、`"utf-8"`、`"latin1"` 均可）。
    pub fn for_name(name: &str) -> Result<Self> {
        match Encoding::for_label(name.as_bytes()) {
            Some(encoding) if encoding != encoding_rs::REPLACEMENT => Ok(Self { encoding }),
            _ => Err(CodecError::UnsupportedCharset {
                name: name.to_owned(),
            }
            .into()),
        }
    }

    /// 解析配置中的默认字符集。
    pub fn from_config(config: &CharsetConfig) -> Result<Self> {
        config.validate()?;
        Self::for_name(&config.default_charset)
    }

    /// 规范名称，例如 `UTF-8`、`GBK`、`windows-1252`。
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// 可解析的全部字符集规范名称，按字典序排列。
    pub fn available() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = [
            encoding_rs::BIG5,
            encoding_rs::EUC_JP,
            encoding_rs::EUC_KR,
            encoding_rs::GB18030,
            encoding_rs::GBK,
            encoding_rs::IBM866,
            encoding_rs::ISO_2022_JP,
            encoding_rs::ISO_8859_2,
            encoding_rs::ISO_8859_3,
            encoding_rs::ISO_8859_4,
            encoding_rs::ISO_8859_5,
            encoding_rs::ISO_8859_6,
            encoding_rs::ISO_8859_7,
            encoding_rs::ISO_8859_8,
            encoding_rs::ISO_8859_8_I,
            encoding_rs::ISO_8859_10,
            encoding_rs::ISO_8859_13,
            encoding_rs::ISO_8859_14,
            encoding_rs::ISO_8859_15,
            encoding_rs::ISO_8859_16,
            encoding_rs::KOI8_R,
            encoding_rs::KOI8_U,
            encoding_rs::MACINTOSH,
            encoding_rs::SHIFT_JIS,
            encoding_rs::UTF_16BE,
            encoding_rs::UTF_16LE,
            encoding_rs::UTF_8,
            encoding_rs::WINDOWS_874,
            encoding_rs::WINDOWS_1250,
            encoding_rs::WINDOWS_1251,
            encoding_rs::WINDOWS_1252,
            encoding_rs::WINDOWS_1253,
            encoding_rs::WINDOWS_1254,
            encoding_rs::WINDOWS_1255,
            encoding_rs::WINDOWS_1256,
            encoding_rs::WINDOWS_1257,
            encoding_rs::WINDOWS_1258,
            encoding_rs::X_MAC_CYRILLIC,
            encoding_rs::X_USER_DEFINED,
        ]
        .iter()
        .map(|encoding| encoding.name())
        .collect();
        names.sort_unstable();
        names
    }

    /// 能否作为编码目标；UTF-16 等只支持解码。
    pub fn can_encode(&self) -> bool {
        self.encoding.output_encoding() == self.encoding
    }

    /// 把文本编码为已翻转的字节缓冲。
    pub fn encode(&self, text: &str) -> Result<ByteBuffer> {
        if !self.can_encode() {
            return Err(CodecError::EncoderUnavailable {
                charset: self.name(),
            }
            .into());
        }
        let (bytes, _, unmappable) = self.encoding.encode(text);
        if unmappable {
            return Err(CodecError::Unmappable {
                charset: self.name(),
            }
            .into());
        }
        let mut out = ByteBuffer::allocate(bytes.len().max(1))?;
        out.put_slice(&bytes)?;
        out.flip();
        Ok(out)
    }

    /// 编码字符缓冲的剩余区间；成功时 `chars` 被排空，失败时游标不变。
    pub fn encode_buffer(&self, chars: &mut CharBuffer) -> Result<ByteBuffer> {
        let text: String = chars.as_slice().iter().collect();
        let out = self.encode(&text)?;
        chars.advance(chars.remaining())?;
        Ok(out)
    }

    /// 解码字节缓冲的剩余区间为已翻转的字符缓冲；成功时 `bytes` 被排空，失败时游标不变。
    pub fn decode(&self, bytes: &mut ByteBuffer) -> Result<CharBuffer> {
        let text = self.decode_to_string(bytes)?;
        let count = text.chars().count();
        let mut out = CharBuffer::allocate(count.max(1))?;
        for ch in text.chars() {
            out.put(ch)?;
        }
        out.flip();
        Ok(out)
    }

    /// 解码字节缓冲的剩余区间为 `String`。
    pub fn decode_to_string(&self, bytes: &mut ByteBuffer) -> Result<String> {
        let text = self
            .encoding
            .decode_without_bom_handling_and_without_replacement(bytes.as_slice())
            .ok_or(CodecError::Malformed {
                charset: self.name(),
            })?
            .into_owned();
        bytes.advance(bytes.remaining())?;
        Ok(text)
    }
}

/// 按字符集名称编码文本，便于一次性调用。
pub fn encode(text: &str, charset: &str) -> Result<ByteBuffer> {
    Charset::for_name(charset)?.encode(text)
}

/// 按字符集名称解码字节缓冲的剩余区间。
pub fn decode(bytes: &mut ByteBuffer, charset: &str) -> Result<CharBuffer> {
    Charset::for_name(charset)?.decode(bytes)
}
