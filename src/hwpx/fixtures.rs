//! In-memory HWPX packages for tests.

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Zip the given entries in order.
pub(crate) fn zip_package(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Wrap paragraphs in a section root with the usual namespace prefixes.
pub(crate) fn section_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><hs:sec xmlns:hs="http://www.hancom.co.kr/hwpml/2011/section" xmlns:hp="http://www.hancom.co.kr/hwpml/2011/paragraph" xmlns:hc="http://www.hancom.co.kr/hwpml/2011/core">{}</hs:sec>"#,
        body
    )
}

pub(crate) const CONTENT_HPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<opf:package xmlns:opf="http://www.idpf.org/2007/opf/" version="" unique-identifier="" id="">
  <opf:metadata>
    <opf:title>분기 보고서</opf:title>
    <opf:language>ko</opf:language>
    <opf:meta name="creator" content="text">김철수</opf:meta>
    <opf:meta name="subject" content="text">실적</opf:meta>
    <opf:meta name="keyword" content="text">보고, 분기</opf:meta>
    <opf:meta name="CreatedDate" content="text">2024-01-02T03:04:05Z</opf:meta>
  </opf:metadata>
  <opf:manifest>
    <opf:item id="header" href="Contents/header.xml" media-type="application/xml"/>
    <opf:item id="image1" href="BinData/image1.png" media-type="image/png" isEmbeded="1"/>
    <opf:item id="section0" href="Contents/section0.xml" media-type="application/xml"/>
    <opf:item id="section1" href="Contents/section1.xml" media-type="application/xml"/>
  </opf:manifest>
  <opf:spine>
    <opf:itemref idref="header" linear="yes"/>
    <opf:itemref idref="section0" linear="yes"/>
    <opf:itemref idref="section1" linear="yes"/>
  </opf:spine>
</opf:package>"#;

pub(crate) const HEADER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hh:head xmlns:hh="http://www.hancom.co.kr/hwpml/2011/head" version="1.4" secCnt="2">
  <hh:refList>
    <hh:charProperties itemCnt="2">
      <hh:charPr id="0" height="1000"><hh:underline type="NONE" shape="SOLID"/><hh:strikeout shape="NONE"/></hh:charPr>
      <hh:charPr id="1" height="1000"><hh:bold/><hh:underline type="NONE" shape="SOLID"/></hh:charPr>
    </hh:charProperties>
    <hh:paraProperties itemCnt="2">
      <hh:paraPr id="0"><hh:heading type="NONE" idRef="0" level="0"/></hh:paraPr>
      <hh:paraPr id="1"><hh:heading type="OUTLINE" idRef="0" level="0"/></hh:paraPr>
    </hh:paraProperties>
    <hh:styles itemCnt="1">
      <hh:style id="0" type="PARA" name="바탕글" engName="Normal" paraPrIDRef="0" charPrIDRef="0"/>
    </hh:styles>
  </hh:refList>
</hh:head>"#;

pub(crate) const VERSION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hv:HCFVersion xmlns:hv="http://www.hancom.co.kr/hwpml/2011/version" tagetApplication="WORDPROCESSOR" major="5" minor="1" micro="1" buildNumber="0" os="1" xmlVersion="1.4" application="Hancom Office Hangul" appVersion="12.0.0.0"/>"#;

pub(crate) const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Two sections, a heading, a table and one embedded image.
pub(crate) fn sample_package() -> Vec<u8> {
    let section0 = section_xml(
        r#"<hp:p paraPrIDRef="1" styleIDRef="0"><hp:run charPrIDRef="0"><hp:t>분기 보고서</hp:t></hp:run></hp:p>
<hp:p paraPrIDRef="0"><hp:run charPrIDRef="0"><hp:t>매출이 </hp:t></hp:run><hp:run charPrIDRef="1"><hp:t>증가</hp:t></hp:run><hp:run charPrIDRef="0"><hp:t>했다.</hp:t></hp:run></hp:p>"#,
    );
    let section1 = section_xml(
        r#"<hp:p><hp:run><hp:tbl rowCnt="2" colCnt="2">
<hp:tr><hp:tc><hp:subList><hp:p><hp:run><hp:t>항목</hp:t></hp:run></hp:p></hp:subList></hp:tc><hp:tc><hp:subList><hp:p><hp:run><hp:t>값</hp:t></hp:run></hp:p></hp:subList></hp:tc></hp:tr>
<hp:tr><hp:tc><hp:subList><hp:p><hp:run><hp:t>매출</hp:t></hp:run></hp:p></hp:subList></hp:tc><hp:tc><hp:subList><hp:p><hp:run><hp:t>100</hp:t></hp:run></hp:p></hp:subList></hp:tc></hp:tr>
</hp:tbl></hp:run></hp:p>
<hp:p><hp:run><hp:pic id="1"><hc:img binaryItemIDRef="image1"/></hp:pic></hp:run></hp:p>"#,
    );
    zip_package(&[
        ("mimetype", b"application/hwp+zip".as_slice()),
        ("version.xml", VERSION_XML.as_bytes()),
        ("Contents/content.hpf", CONTENT_HPF.as_bytes()),
        ("Contents/header.xml", HEADER_XML.as_bytes()),
        ("Contents/section0.xml", section0.as_bytes()),
        ("Contents/section1.xml", section1.as_bytes()),
        ("BinData/image1.png", PNG),
    ])
}
