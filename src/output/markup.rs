//! Markup Tree Implementation
//!
//! 出力XMLの要素ツリーと、quick-xmlによるシリアライズを提供するモジュール。

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::error::XlsxJobsError;

/// 出力ドキュメントのルート要素名
pub const ROOT_ELEMENT: &str = "DEFTABLE";

/// ルート要素に付与する名前空間宣言
const ROOT_ATTRIBUTES: [(&str, &str); 2] = [
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xsi:noNamespaceSchemaLocation", "Folder.xsd"),
];

/// 出力要素
///
/// 属性は挿入順に出力されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    /// 属性・子要素のない要素を生成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 属性を末尾に追加
    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// 属性を追加した要素を返す
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_attribute(name, value);
        self
    }

    /// 子要素を末尾に追加
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// 属性値を取得
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// 属性が存在するか
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(k, _)| k == name)
    }
}

/// 出力ドキュメント（`DEFTABLE`ルートとFOLDER要素の列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// FOLDER要素の列からドキュメントを生成
    pub fn new(folders: Vec<Element>) -> Self {
        let mut root = Element::new(ROOT_ELEMENT);
        for (name, value) in ROOT_ATTRIBUTES {
            root.push_attribute(name, value);
        }
        root.children = folders;
        Self { root }
    }

    /// FOLDER要素
    pub fn folders(&self) -> &[Element] {
        &self.root.children
    }

    /// XMLとして書き出す
    ///
    /// 宣言（`<?xml version="1.0" encoding="utf-8"?>`）の後に、
    /// タブでインデントした要素ツリーを出力します。
    /// 属性値の`&` `<` `>` `"` `'`はエスケープされます。
    ///
    /// # 引数
    ///
    /// * `output` - 出力先のライター
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 出力に成功した場合
    /// * `Err(XlsxJobsError)` - 書き込みに失敗した場合
    pub fn write_to<W: Write>(&self, output: W) -> Result<(), XlsxJobsError> {
        let mut writer = Writer::new_with_indent(output, b'\t', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        // ルートは子要素がなくても開始・終了タグの組で出力する
        write_element(&mut writer, &self.root, true)?;
        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    /// XML文字列に変換
    pub fn to_xml_string(&self) -> Result<String, XlsxJobsError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| XlsxJobsError::Config(format!("Output is not valid UTF-8: {}", e)))
    }
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
    force_pair: bool,
) -> Result<(), XlsxJobsError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() && !force_pair {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(writer, child, false)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
