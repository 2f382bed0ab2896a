//! Web 配置表单
//!
//! 同一个端口上两种请求：普通 GET 返回由调用方描述的表单页面，
//! `GET /ajax_inputs?...` 携带提交的字段值，分发后应答并重启设备。

mod handlers;
mod html;
mod server;
#[cfg(target_os = "espidf")]
mod softap;

pub use handlers::{
    parse_submission, query_string, read_request, FieldValue, Request, SubmissionError, ACK_BODY,
    SEPARATOR, SUBMISSION_MARKER, SUBMIT_PATH,
};
pub use server::{DeviceRestart, FormSession, Listener, Outcome, Restart, TcpAcceptor};
#[cfg(target_os = "espidf")]
pub use softap::SoftAp;
