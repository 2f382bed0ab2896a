//! 表单会话：接受连接、分类请求、渲染或处理提交

use std::io::{self, BufReader, Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::time::Duration;

use super::handlers::{self, FieldValue, Request, SubmissionError};
use super::html;
use crate::config::{PortalConfig, SegmentPolicy};
use crate::form::{compute_field_ids, Form};

/// 连接来源
pub trait Listener {
    type Stream: Read + Write;

    /// 非阻塞：没有待处理的连接时返回 `Ok(None)`
    fn accept(&mut self) -> io::Result<Option<Self::Stream>>;
}

/// 设备重启
pub trait Restart {
    fn restart(&mut self);
}

impl<F: FnMut()> Restart for F {
    fn restart(&mut self) {
        self()
    }
}

/// ESP-IDF 上调用 `esp_restart`，其他平台结束进程
pub struct DeviceRestart;

impl Restart for DeviceRestart {
    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        log::info!("Restarting device");
        unsafe { esp_idf_svc::sys::esp_restart() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        log::info!("Restart requested, exiting");
        std::process::exit(0)
    }
}

/// 非阻塞 TCP 监听
pub struct TcpAcceptor {
    listener: TcpListener,
    read_timeout: Option<Duration>,
}

impl TcpAcceptor {
    pub fn bind(port: u16, read_timeout: Option<Duration>) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            read_timeout,
        })
    }

    pub fn local_port(&self) -> io::Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }
}

impl Listener for TcpAcceptor {
    type Stream = TcpStream;

    fn accept(&mut self) -> io::Result<Option<TcpStream>> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                log::info!("Client connected: {}", peer);
                stream.set_nonblocking(false)?;
                stream.set_read_timeout(self.read_timeout)?;
                Ok(Some(stream))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// 一次 `handle_client` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 没有待处理的连接
    Idle,
    /// 已返回整页表单
    Rendered { fields: usize },
    /// 已分发提交的值并触发重启
    Submitted { values: usize },
    /// 提交请求行无法解析，未应答
    Aborted(SubmissionError),
    /// 请求在分类前结束，未应答
    Dropped,
}

type FormBuilder<'a> = Box<dyn FnMut(&mut Form<'_>) + 'a>;
type DataCallback<'a> = Box<dyn FnMut(usize, String) + 'a>;

pub struct FormSession<'a, L, R> {
    listener: L,
    restart: R,
    title: String,
    policy: SegmentPolicy,
    restart_delay: Duration,
    /// 最近一次渲染的字段数；本进程尚未渲染过时为 `None`
    field_count: Option<usize>,
    form_builder: Option<FormBuilder<'a>>,
    callback: Option<DataCallback<'a>>,
}

impl<'a, L: Listener, R: Restart> FormSession<'a, L, R> {
    pub fn new(listener: L, restart: R, config: &PortalConfig) -> Self {
        Self {
            listener,
            restart,
            title: config.title.clone(),
            policy: config.malformed_segment,
            restart_delay: config.restart_delay(),
            field_count: None,
            form_builder: None,
            callback: None,
        }
    }

    /// 下一次渲染起生效
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// 每次渲染调用一次，在其中调用 `add_*` 描述表单
    pub fn set_form_builder(&mut self, builder: impl FnMut(&mut Form<'_>) + 'a) {
        self.form_builder = Some(Box::new(builder));
    }

    /// 每个提交字段调用一次：(从 1 开始的序号, 值)
    pub fn set_callback(&mut self, callback: impl FnMut(usize, String) + 'a) {
        self.callback = Some(Box::new(callback));
    }

    pub fn field_count(&self) -> Option<usize> {
        self.field_count
    }

    /// 处理至多一个连接，由外部循环反复调用
    pub fn handle_client(&mut self) -> anyhow::Result<Outcome> {
        let Some(stream) = self.listener.accept()? else {
            return Ok(Outcome::Idle);
        };
        self.serve(stream)
    }

    fn serve(&mut self, mut stream: L::Stream) -> anyhow::Result<Outcome> {
        let request = {
            let mut reader = BufReader::new(&mut stream);
            match handlers::read_request(&mut reader) {
                Ok(request) => request,
                Err(e) => {
                    log::warn!("Failed to read request: {}", e);
                    None
                }
            }
        };

        match request {
            None => {
                log::info!("Connection ended before the request was complete");
                Ok(Outcome::Dropped)
            }
            Some(Request::Render) => {
                let (page, fields) = self.render_page()?;
                self.field_count = Some(fields);
                handlers::write_page(&mut stream, &page)?;
                log::info!("Form sent with {} fields", fields);
                Ok(Outcome::Rendered { fields })
            }
            Some(Request::Submission(line)) => self.submit(stream, &line),
        }
    }

    /// 整页 HTML 与其中的字段数
    pub fn render_page(&mut self) -> anyhow::Result<(String, usize)> {
        let mut page = String::new();
        html::document_start(&mut page, &self.title)?;
        let fields = self.describe(&mut page);
        html::document_end(&mut page, &compute_field_ids(fields))?;
        Ok((page, fields))
    }

    fn describe(&mut self, page: &mut String) -> usize {
        let mut form = Form::new(page);
        match self.form_builder.as_mut() {
            Some(builder) => builder(&mut form),
            None => log::warn!("No form builder set, rendering an empty form"),
        }
        form.field_count()
    }

    fn submit(&mut self, mut stream: L::Stream, line: &str) -> anyhow::Result<Outcome> {
        let field_count = match self.field_count {
            Some(n) => n,
            None => {
                // 重启后直接收到提交：重放表单描述以得到字段数
                let n = self.describe(&mut String::new());
                log::info!("Submission before any render, recounted {} fields", n);
                n
            }
        };

        let values = match handlers::parse_submission(line, field_count, self.policy) {
            Ok(values) => values,
            Err(e) => {
                log::warn!("Submission aborted: {}", e);
                return Ok(Outcome::Aborted(e));
            }
        };

        let count = values.len();
        for FieldValue { index, value } in values {
            log::info!("Field {} received", index);
            log::debug!("Field {} = {:?}", index, value);
            match self.callback.as_mut() {
                Some(callback) => callback(index, value),
                None => log::debug!("No data callback set, field {} discarded", index),
            }
        }

        if let Err(e) = handlers::write_ack(&mut stream) {
            log::error!("Failed to acknowledge submission: {}", e);
        }
        drop(stream);

        std::thread::sleep(self.restart_delay);
        self.restart.restart();
        Ok(Outcome::Submitted { values: count })
    }
}
