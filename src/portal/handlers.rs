//! 请求分类、提交解析与固定响应

use std::io::{self, BufRead, Read, Write};

use http::header::{CONNECTION, CONTENT_TYPE};
use http::{Response, StatusCode};

use crate::codec::normalize_value;
use crate::config::SegmentPolicy;
use crate::form::compute_field_ids;

/// 提交请求的路径
pub const SUBMIT_PATH: &str = "/ajax_inputs";
/// 以此开头的请求行即为提交
pub const SUBMISSION_MARKER: &str = "GET /ajax_inputs";
/// 查询串中字段之间的分隔符
pub const SEPARATOR: &str = "__SEP__";
/// 提交成功后的应答正文
pub const ACK_BODY: &str = "Saved; restarting...";
/// 单行请求的长度上限，超出即断开
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// 请求类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// 读到空行且没有提交标记：返回整页表单
    Render,
    /// 提交请求，携带该请求行（已去除首尾空白）
    Submission(String),
}

/// 提交解析失败：不应答，直接断开
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission has no query string")]
    MissingQuery,
    #[error("query string is not terminated by a space")]
    UnterminatedQuery,
}

/// 一个提交字段：从 1 开始的序号与规范化后的值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub index: usize,
    pub value: String,
}

/// 逐行读取请求直到可以分类
///
/// 流在分类前结束、或某一行超过 [`MAX_LINE_LEN`] 时返回 `Ok(None)`。
pub fn read_request<R: BufRead>(reader: &mut R) -> io::Result<Option<Request>> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let limit = MAX_LINE_LEN as u64 + 1;
        if reader.by_ref().take(limit).read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.len() > MAX_LINE_LEN && buf.last() != Some(&b'\n') {
            log::warn!("Request line longer than {} bytes, dropping", MAX_LINE_LEN);
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            return Ok(Some(Request::Render));
        }
        if line.starts_with(SUBMISSION_MARKER) {
            return Ok(Some(Request::Submission(line.to_string())));
        }
        log::trace!("header: {}", line);
    }
}

/// 取出 `?` 与其后第一个空格之间的查询串，并去掉 `&nocache=` 之类的尾巴
///
/// 字段值经过 `encodeURIComponent`，查询串里原样出现的 `&` 只可能来自防缓存参数。
pub fn query_string(request_line: &str) -> Result<&str, SubmissionError> {
    let start = request_line
        .find('?')
        .ok_or(SubmissionError::MissingQuery)?
        + 1;
    let end = request_line[start..]
        .find(' ')
        .ok_or(SubmissionError::UnterminatedQuery)?
        + start;

    let query = &request_line[start..end];
    Ok(query.split_once('&').map_or(query, |(fields, _)| fields))
}

/// 把提交请求行解析为按渲染顺序排列的字段值，最多 `field_count` 个
pub fn parse_submission(
    request_line: &str,
    field_count: usize,
    policy: SegmentPolicy,
) -> Result<Vec<FieldValue>, SubmissionError> {
    let query = query_string(request_line)?;
    let ids = compute_field_ids(field_count);

    let mut values = Vec::with_capacity(field_count);
    let mut index = 1;
    for segment in query.split(SEPARATOR) {
        if index > field_count {
            break;
        }

        let Some((tag, raw)) = segment.split_once('=') else {
            log::warn!("Malformed segment {:?} at field {}, {:?}", segment, index, policy);
            if policy == SegmentPolicy::ConsumeIndex {
                index += 1;
            }
            continue;
        };

        let expected = ids[index - 1];
        if !expected.matches(tag) {
            log::warn!("Field {} expected tag {} but got {:?}", index, expected, tag);
        }

        values.push(FieldValue {
            index,
            value: normalize_value(raw),
        });
        index += 1;
    }

    Ok(values)
}

/// 整页表单应答
pub fn write_page<W: Write>(out: &mut W, page: &str) -> io::Result<()> {
    write_response(out, "text/html", page)
}

/// 提交成功应答
pub fn write_ack<W: Write>(out: &mut W) -> io::Result<()> {
    write_response(out, "text/plain", ACK_BODY)
}

fn write_response<W: Write>(out: &mut W, content_type: &str, body: &str) -> io::Result<()> {
    let resp = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONNECTION, "close")
        .body(body)
        .map_err(io::Error::other)?;

    let status = resp.status();
    write!(
        out,
        "{:?} {} {}\r\n",
        resp.version(),
        status.as_str(),
        status.canonical_reason().unwrap_or_default()
    )?;
    for (name, value) in resp.headers() {
        out.write_all(name.as_str().as_bytes())?;
        out.write_all(b": ")?;
        out.write_all(value.as_bytes())?;
        out.write_all(b"\r\n")?;
    }
    out.write_all(b"\r\n")?;
    out.write_all(resp.body().as_bytes())?;
    out.write_all(b"\r\n")?;
    out.flush()
}
