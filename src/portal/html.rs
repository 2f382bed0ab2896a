//! 页面骨架：样式、表头、保存按钮与提交脚本

use std::fmt::{self, Write};

use super::handlers::{SEPARATOR, SUBMIT_PATH};
use crate::form::{escape, FieldId};

const STYLE: &str = r#"<style>
:root {
  --primary: #2563eb;
  --primary-dark: #1d4ed8;
  --success: #059669;
  --background: #f8fafc;
  --card: #ffffff;
  --text: #1e293b;
  --border: #e2e8f0;
  --focus: #3b82f6;
}
* { box-sizing: border-box; }
body {
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
  background: linear-gradient(135deg, var(--background) 0%, #e2e8f0 100%);
  margin: 0; padding: 20px; color: var(--text); line-height: 1.6;
}
#container {
  max-width: 800px; margin: 0 auto; background: var(--card);
  border-radius: 16px; box-shadow: 0 10px 15px -3px rgba(0, 0, 0, 0.1); overflow: hidden;
}
#header {
  background: linear-gradient(135deg, var(--primary) 0%, var(--primary-dark) 100%);
  color: white; text-align: center; padding: 16px 20px; font-size: 1.4rem; margin: 0;
}
#inputs { padding: 40px; }
.subheading {
  font-size: 1.5rem; font-weight: 600; margin: 40px 0 20px 0;
  padding-bottom: 10px; border-bottom: 2px solid var(--border);
}
.subheading:first-child { margin-top: 0; }
.field-group { margin-bottom: 24px; }
.field-label { display: block; font-size: 1.1rem; font-weight: 500; margin-bottom: 8px; }
input[type="text"], select {
  width: 100%; height: 48px; padding: 12px; font-size: 1.1rem;
  border: 2px solid var(--border); border-radius: 8px; background: var(--card); outline: none;
}
input[type="text"]:focus, select:focus { border-color: var(--focus); }
input[type="color"] {
  width: 100%; height: 60px; padding: 4px;
  border: 2px solid var(--border); border-radius: 8px; cursor: pointer;
}
.button-separator { height: 1px; background: var(--border); margin: 30px 0 20px 0; }
.save-button {
  width: 100%; padding: 20px; font-size: 1.2rem; font-weight: 600; color: white;
  background: var(--success); border: none; border-radius: 12px; cursor: pointer;
}
.success-message {
  background: #d1fae5; color: #065f46; padding: 32px; border-radius: 12px;
  text-align: center; font-size: 1.3rem; font-weight: 600; border: 2px solid #34d399;
}
@media (max-width: 600px) {
  body { padding: 10px; }
  #inputs { padding: 20px; }
}
</style>"#;

/// 从 DOCTYPE 写到字段容器开头
pub fn document_start(out: &mut impl Write, title: &str) -> fmt::Result {
    let title = escape(title);
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"UTF-8\">")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    )?;
    writeln!(out, "{}", STYLE)?;
    writeln!(out, "<title>{}</title>", title)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<div id=\"container\">")?;
    writeln!(out, "<h1 id=\"header\">{}</h1>", title)?;
    writeln!(out, "<div id=\"inputs\">")
}

/// 保存按钮与提交脚本
///
/// `ids` 必须与本页渲染字段时使用的 id 序列一致，脚本按此顺序拼接查询串。
pub fn document_end(out: &mut impl Write, ids: &[FieldId]) -> fmt::Result {
    writeln!(out, "<div class=\"button-separator\"></div>")?;
    writeln!(
        out,
        "<button type=\"button\" class=\"save-button\" onclick=\"sendForm()\">Save Configuration</button>"
    )?;
    writeln!(out, "</div></div>")?;

    writeln!(out, "<script>")?;
    let ids = ids
        .iter()
        .map(|id| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "var FIELD_IDS = [{}];", ids)?;
    writeln!(out, "function sendForm() {{")?;
    writeln!(out, "  var parts = [];")?;
    writeln!(out, "  for (var i = 0; i < FIELD_IDS.length; i++) {{")?;
    writeln!(out, "    var field = document.getElementById(FIELD_IDS[i]);")?;
    // 缺失的字段保留一个空段，服务端按位置对应
    writeln!(
        out,
        "    parts.push(field ? FIELD_IDS[i] + '=' + encodeURIComponent(field.value) : '');"
    )?;
    writeln!(out, "  }}")?;
    writeln!(out, "  var query = '?' + parts.join('{}');", SEPARATOR)?;
    writeln!(out, "  var nocache = '&nocache=' + Math.random() * 1000000;")?;
    writeln!(out, "  document.body.innerHTML = '';")?;
    writeln!(out, "  var done = document.createElement('div');")?;
    writeln!(out, "  done.className = 'success-message';")?;
    writeln!(out, "  done.textContent = '\u{2713} Configuration Saved!';")?;
    writeln!(out, "  document.body.appendChild(done);")?;
    writeln!(out, "  var request = new XMLHttpRequest();")?;
    writeln!(
        out,
        "  request.open('GET', '{}' + query + nocache, true);",
        SUBMIT_PATH
    )?;
    writeln!(out, "  request.send(null);")?;
    writeln!(out, "}}")?;
    writeln!(out, "</script>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::compute_field_ids;

    #[test]
    fn title_is_escaped_in_head_and_header() {
        let mut page = String::new();
        document_start(&mut page, "Clock <setup>").unwrap();
        assert!(page.starts_with("<!DOCTYPE html>\n"));
        assert!(page.contains("<title>Clock &lt;setup&gt;</title>"));
        assert!(page.contains("<h1 id=\"header\">Clock &lt;setup&gt;</h1>"));
        assert!(page.trim_end().ends_with("<div id=\"inputs\">"));
    }

    #[test]
    fn script_lists_field_ids_in_order() {
        let mut page = String::new();
        document_end(&mut page, &compute_field_ids(3)).unwrap();
        assert!(page.contains("var FIELD_IDS = ['x11', 'x12', 'x13'];"));
        assert!(page.contains("parts.join('__SEP__')"));
        assert!(page.contains("request.open('GET', '/ajax_inputs' + query + nocache, true);"));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn script_without_fields() {
        let mut page = String::new();
        document_end(&mut page, &[]).unwrap();
        assert!(page.contains("var FIELD_IDS = [];"));
    }
}
