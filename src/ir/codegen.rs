//! # Code Generation
//!
//! Converts IR modules to JavaScript source text.

use super::ops::{AutoTable, DeclStyle, ExportStyle, Expr, Function, Import, Module, Op};

const INDENT: &str = "  ";

/// Line-oriented source writer tracking the current indentation.
struct Writer {
    out: String,
    depth: usize,
}

impl Writer {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }
}

/// Quote a string as a single-quoted JavaScript literal.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Lines of a `//` comment. Every JavaScript line terminator starts a new
/// line so comment text can never leak into code.
fn comment_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split("\r\n")
        .flat_map(|part| part.split(['\r', '\n', '\u{2028}', '\u{2029}']))
        .map(|line| {
            if line.is_empty() {
                "//".to_string()
            } else {
                format!("// {}", line)
            }
        })
}

/// Format a number the way JavaScript prints it (`10`, `10.5`).
pub fn js_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl Expr {
    /// Render as JavaScript source.
    pub fn to_js(&self) -> String {
        match self {
            Expr::Str(s) => js_string(s),
            Expr::Num(n) => js_number(*n),
            Expr::Ident(name) => name.clone(),
            Expr::Offset(name, by) if *by < 0.0 => format!("{} - {}", name, js_number(-by)),
            Expr::Offset(name, by) => format!("{} + {}", name, js_number(*by)),
            Expr::DataOr { key, fallback } => format!("data.{} || {}", key, fallback.to_js()),
            Expr::Array(items) => {
                let parts: Vec<String> = items.iter().map(Expr::to_js).collect();
                format!("[{}]", parts.join(", "))
            }
            Expr::Raw(src) => src.clone(),
        }
    }
}

impl Import {
    fn to_js(&self) -> String {
        match self {
            Import::Named { names, from } => {
                format!("import {{ {} }} from {};", names.join(", "), js_string(from))
            }
            Import::Default { name, from } => format!("import {} from {};", name, js_string(from)),
            Import::SideEffect(from) => format!("import {};", js_string(from)),
        }
    }
}

impl Module {
    /// Compile the module to JavaScript source.
    pub fn to_source(&self) -> String {
        let mut w = Writer::new();

        if !self.imports.is_empty() {
            for import in &self.imports {
                w.line(&import.to_js());
            }
            w.blank();
        }

        emit_function(&mut w, &self.function);

        if !self.usage.is_empty() {
            w.blank();
            for line in self.usage.iter().flat_map(|l| comment_lines(l)) {
                w.line(&line);
            }
        }

        // Generated files end without a trailing newline
        let trimmed = w.out.trim_end_matches('\n').len();
        w.out.truncate(trimmed);
        w.out
    }
}

fn emit_function(w: &mut Writer, f: &Function) {
    let async_kw = if f.is_async { "async " } else { "" };
    let export = match f.export {
        ExportStyle::Export => "export ",
        ExportStyle::Default if f.style == DeclStyle::Function => "export default ",
        ExportStyle::Default | ExportStyle::None => "",
    };

    match f.style {
        DeclStyle::Function => {
            w.line(&format!(
                "{}{}function {}(data = {{}}) {{",
                export, async_kw, f.name
            ));
        }
        DeclStyle::Arrow => {
            w.line(&format!(
                "{}const {} = {}(data = {{}}) => {{",
                export, f.name, async_kw
            ));
        }
    }

    w.indented(|w| emit_ops(w, &f.body));

    match f.style {
        DeclStyle::Function => w.line("}"),
        DeclStyle::Arrow => w.line("};"),
    }

    if f.style == DeclStyle::Arrow && f.export == ExportStyle::Default {
        w.blank();
        w.line(&format!("export default {};", f.name));
    }
}

fn emit_ops(w: &mut Writer, ops: &[Op]) {
    for op in ops {
        emit_op(w, op);
    }
}

fn emit_op(w: &mut Writer, op: &Op) {
    match op {
        Op::Comment(text) => {
            for line in comment_lines(text) {
                w.line(&line);
            }
        }
        Op::Blank => w.blank(),
        Op::NewDocument => {
            w.line("const doc = new jsPDF({");
            w.indented(|w| {
                w.line("orientation: 'portrait',");
                w.line("unit: 'mm',");
                w.line("format: 'a4'");
            });
            w.line("});");
        }
        Op::SetFont(None) => w.line("doc.setFont('helvetica');"),
        Op::SetFont(Some(style)) => {
            w.line(&format!("doc.setFont('helvetica', '{}');", style.name()))
        }
        Op::SetFontSize(size) => w.line(&format!("doc.setFontSize({});", js_number(*size))),
        Op::SetTextColor(rgb) => {
            w.line(&format!("doc.setTextColor({}, {}, {});", rgb.0, rgb.1, rgb.2))
        }
        Op::Text { value, x, y, align } => {
            let options = align
                .map(|a| format!(", {{ align: '{}' }}", a.name()))
                .unwrap_or_default();
            w.line(&format!(
                "doc.text({}, {}, {}{});",
                value.to_js(),
                x.to_js(),
                y.to_js(),
                options
            ));
        }
        Op::Rect {
            x,
            y,
            width,
            height,
        } => w.line(&format!(
            "doc.rect({}, {}, {}, {});",
            x.to_js(),
            y.to_js(),
            width.to_js(),
            height.to_js()
        )),
        Op::Const { name, value } => w.line(&format!("const {} = {};", name, value.to_js())),
        Op::ConstRows {
            name,
            data_key,
            rows,
        } => {
            let source = data_key
                .as_ref()
                .map(|k| format!("data.{} || ", k))
                .unwrap_or_default();
            w.line(&format!("const {} = {}[", name, source));
            w.indented(|w| emit_rows(w, rows));
            w.line("];");
        }
        Op::ItemRows {
            name,
            header,
            fields,
        } => {
            w.line(&format!("const {} = [", name));
            w.indented(|w| w.line(&Expr::strings(header).to_js()));
            w.line("];");
            w.blank();
            w.line("data.items.forEach(item => {");
            w.indented(|w| {
                w.line(&format!("{}.push([", name));
                w.indented(|w| {
                    for (i, field) in fields.iter().enumerate() {
                        let sep = if i + 1 == fields.len() { "" } else { "," };
                        w.line(&format!("item.{} || ''{}", field, sep));
                    }
                });
                w.line("]);");
            });
            w.line("});");
        }
        Op::QrDataUrl { name, value, width } => {
            w.line(&format!(
                "const {} = await QRCode.toDataURL({}, {{",
                name,
                value.to_js()
            ));
            w.indented(|w| {
                w.line(&format!("width: {},", js_number(*width)));
                w.line("margin: 1,");
            });
            w.line("});");
        }
        Op::BarcodeDataUrl {
            name,
            value,
            format,
        } => {
            w.line("const canvas = document.createElement('canvas');");
            w.line(&format!("JsBarcode(canvas, {}, {{", value.to_js()));
            w.indented(|w| {
                w.line(&format!("format: {},", js_string(format)));
                w.line("width: 2,");
                w.line("height: 100,");
                w.line("displayValue: true");
            });
            w.line("});");
            w.line(&format!("const {} = canvas.toDataURL();", name));
        }
        Op::AddImage {
            source,
            format,
            x,
            y,
            width,
            height,
        } => w.line(&format!(
            "doc.addImage({}, '{}', {}, {}, {}, {});",
            source.to_js(),
            format.name(),
            x.to_js(),
            y.to_js(),
            width.to_js(),
            height.to_js()
        )),
        Op::AutoTable(table) => emit_auto_table(w, table),
        Op::LastTableY {
            name,
            gap,
            fallback,
        } => w.line(&format!(
            "const {} = doc.lastAutoTable ? doc.lastAutoTable.finalY + {} : {};",
            name,
            js_number(*gap),
            js_number(*fallback)
        )),
        Op::If { condition, body } => {
            w.line(&format!("if ({}) {{", condition));
            w.indented(|w| emit_ops(w, body));
            w.line("}");
        }
        Op::Try {
            body,
            error_message,
            fallback,
        } => {
            w.line("try {");
            w.indented(|w| emit_ops(w, body));
            w.line("} catch (error) {");
            w.indented(|w| {
                w.line(&format!(
                    "console.error({}, error);",
                    js_string(&format!("{}:", error_message))
                ));
                emit_ops(w, fallback);
            });
            w.line("}");
        }
        Op::Return => w.line("return doc;"),
    }
}

fn emit_rows(w: &mut Writer, rows: &[Vec<String>]) {
    for (i, row) in rows.iter().enumerate() {
        let sep = if i + 1 == rows.len() { "" } else { "," };
        w.line(&format!("{}{}", Expr::strings(row).to_js(), sep));
    }
}

fn emit_auto_table(w: &mut Writer, table: &AutoTable) {
    w.line("doc.autoTable({");
    w.indented(|w| {
        w.line(&format!("startY: {},", table.start_y.to_js()));
        if let Some(left) = &table.margin_left {
            w.line(&format!("margin: {{ left: {} }},", left.to_js()));
        }
        w.line(&format!("head: {},", table.head.to_js()));
        w.line(&format!("body: {},", table.body.to_js()));
        w.line("theme: 'grid',");
        w.line("headStyles: {");
        w.indented(|w| {
            let fill = table.head_fill;
            w.line(&format!("fillColor: [{}, {}, {}],", fill.0, fill.1, fill.2));
            w.line("textColor: [255, 255, 255],");
            w.line("fontStyle: 'bold'");
        });
        w.line("},");
        w.line("styles: {");
        w.indented(|w| {
            w.line("fontSize: 10,");
            w.line("cellPadding: 3");
        });

        if table.column_widths.is_empty() {
            w.line("}");
            return;
        }

        w.line("},");
        w.line("columnStyles: {");
        w.indented(|w| {
            let last = table.column_widths.len() - 1;
            for (i, (width, comment)) in table.column_widths.iter().enumerate() {
                let sep = if i == last { " " } else { ", " };
                let comment = comment
                    .as_ref()
                    .map(|c| format!("// {}", c))
                    .unwrap_or_default();
                let entry = format!("{}: {{ cellWidth: {} }}{}{}", i, width, sep, comment);
                w.line(entry.trim_end());
            }
        });
        w.line("}");
    });
    w.line("});");
}
