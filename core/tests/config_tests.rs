// tests/config_tests.rs
mod common;

use common::*;
use docket::{
  DocketError, FileInfoFilter, ModuleConfig, OutputMapper, Param, PipelineDeclaration, RunSettings, SourceMode,
};
use std::fs;
use tempfile::TempDir;

const DECLARATION: &str = r#"{
  "params": [
    { "name": "transtype", "value": "html5" },
    { "name": "args.css", "location": "css/site.css", "if": "args.css" }
  ],
  "modules": [
    {
      "kind": "module",
      "id": "gen-list",
      "params": [{ "name": "mode", "expression": "$mode", "unless": "skip" }],
      "filters": [{ "format": "ditamap", "processing-role": "resource-only" }]
    },
    {
      "kind": "transform",
      "style": "xsl/topic.xsl",
      "basedir": "src",
      "destdir": "out",
      "includes": [{ "file": "lists/topics.txt", "if": "topics" }],
      "excludes": [{ "name": "lists/skip.txt" }],
      "mapper": { "type": "glob", "from": "*.dita", "to": "*.html" },
      "filenameparameter": "FILENAME",
      "reload-stylesheet": true
    },
    {
      "kind": "filter-chain",
      "name": "clean",
      "format": "dita",
      "filters": [
        { "id": "strip", "params": [{ "name": "keep", "value": "no" }], "unless": "debug" },
        { "id": "link", "filters": [{ "conref": true }] }
      ],
      "file-filters": [{ "format": "ditamap" }]
    }
  ]
}"#;

#[test]
fn test_parse_declaration() {
  setup_tracing();
  let declaration = PipelineDeclaration::from_json_str(DECLARATION).unwrap();

  assert_eq!(declaration.params[0], Param::new("transtype", "html5"));
  assert_eq!(declaration.params[1], Param::location("args.css", "css/site.css").when("args.css"));
  assert_eq!(declaration.modules.len(), 3);

  let ModuleConfig::Module(generic) = &declaration.modules[0] else {
    panic!("Expected generic module");
  };
  assert_eq!(generic.id.as_deref(), Some("gen-list"));
  assert_eq!(generic.params[0], Param::expression("mode", "$mode").unless("skip"));
  assert_eq!(generic.filters, vec![FileInfoFilter::format("ditamap").with_resource_only(true)]);

  let ModuleConfig::Transform(xslt) = &declaration.modules[1] else {
    panic!("Expected transform");
  };
  assert_eq!(xslt.source_mode(1).unwrap(), SourceMode::FileList);
  assert_eq!(xslt.includes[0].condition.if_property.as_deref(), Some("topics"));
  assert_eq!(xslt.excludes[0].file, std::path::PathBuf::from("lists/skip.txt"));
  assert_eq!(xslt.mapper, Some(OutputMapper::glob("*.dita", "*.html")));
  assert_eq!(xslt.filename_parameter.as_deref(), Some("FILENAME"));
  assert!(xslt.reload_stylesheet);

  let ModuleConfig::FilterChain(chain) = &declaration.modules[2] else {
    panic!("Expected filter chain");
  };
  assert_eq!(chain.format, Some(vec!["dita".to_string()]));
  assert_eq!(chain.entries.len(), 2);
  assert_eq!(chain.entries[0].condition.unless_property.as_deref(), Some("debug"));
  assert_eq!(chain.entries[1].filters, vec![FileInfoFilter::any().with_conref(true)]);
  assert_eq!(chain.file_filters, vec![FileInfoFilter::format("ditamap")]);
  assert_eq!(declaration.modules[2].label(), "clean");
  assert_eq!(declaration.modules[2].kind(), "filter-chain");
}

#[test]
fn test_param_value_precedence() {
  let params: Vec<Param> =
    serde_json::from_str(r#"[{ "name": "a", "value": "v", "location": "l", "expression": "e" }, { "name": "b", "location": "l", "expression": "e" }, { "name": "c" }]"#)
      .unwrap();
  assert_eq!(params[0].value.as_deref(), Some("v"));
  assert_eq!(params[1].value.as_deref(), Some("l"));
  assert!(!params[2].is_valid());
}

#[test]
fn test_format_list_and_default() {
  let declaration = PipelineDeclaration::from_json_str(
    r#"{ "modules": [
      { "kind": "filter-chain", "format": ["dita", "markdown"], "filters": [{ "id": "x" }] },
      { "kind": "filter-chain", "filters": [{ "id": "x" }] }
    ] }"#,
  )
  .unwrap();
  let formats: Vec<Vec<FileInfoFilter>> = declaration
    .modules
    .iter()
    .map(|m| match m {
      ModuleConfig::FilterChain(chain) => chain.default_filters(),
      other => panic!("Unexpected {:?}", other),
    })
    .collect();
  assert_eq!(formats[0], vec![FileInfoFilter::format("dita"), FileInfoFilter::format("markdown")]);
  assert_eq!(formats[1], vec![FileInfoFilter::format("dita"), FileInfoFilter::format("ditamap")]);
}

#[test]
fn test_unknown_kind_is_declaration_error() {
  let err = PipelineDeclaration::from_json_str(r#"{ "modules": [{ "kind": "ant-call" }] }"#).unwrap_err();
  assert!(matches!(err, DocketError::Declaration(_)), "{:?}", err);
  assert!(err.is_configuration());
}

#[test]
fn test_unknown_field_is_declaration_error() {
  let err = PipelineDeclaration::from_json_str(r#"{ "modules": [{ "kind": "module", "id": "a", "colour": "red" }] }"#)
    .unwrap_err();
  assert!(matches!(err, DocketError::Declaration(_)), "{:?}", err);
}

#[test]
fn test_from_path() {
  setup_tracing();
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("pipeline.json");
  fs::write(&path, DECLARATION).unwrap();
  assert_eq!(PipelineDeclaration::from_path(&path).unwrap().modules.len(), 3);

  let missing = PipelineDeclaration::from_path(dir.path().join("missing.json")).unwrap_err();
  assert!(matches!(missing, DocketError::Declaration(_)));
}

#[test]
fn test_run_settings_temp_dir_resolution() {
  let dir = TempDir::new().unwrap();
  let explicit = RunSettings::new(dir.path()).temp_dir("/abs/temp").property("dita.temp.dir", "ignored");
  assert_eq!(explicit.resolved_temp_dir().unwrap(), std::path::PathBuf::from("/abs/temp"));

  let relative = RunSettings::new(dir.path()).temp_dir("tmp");
  assert_eq!(relative.resolved_temp_dir().unwrap(), dir.path().join("tmp"));

  let from_property = RunSettings::new(dir.path()).property("dita.temp.dir", "work");
  assert_eq!(from_property.resolved_temp_dir().unwrap(), dir.path().join("work"));

  assert!(matches!(
    RunSettings::new(dir.path()).resolved_temp_dir(),
    Err(DocketError::MissingTempDir)
  ));
}

#[test]
fn test_output_mapper() {
  use std::path::{Path, PathBuf};
  let glob = OutputMapper::glob("*.dita", "*.html");
  assert_eq!(glob.map(Path::new("topics/a.dita")), Some(PathBuf::from("topics/a.html")));
  assert_eq!(glob.map(Path::new("a.ditamap")), None);
  assert_eq!(OutputMapper::Flatten.map(Path::new("x/y/z.xml")), Some(PathBuf::from("z.xml")));
  assert_eq!(OutputMapper::Identity.map(Path::new("x/y.xml")), Some(PathBuf::from("x/y.xml")));
}

#[test]
fn test_empty_base_dir_means_current_dir() {
  let settings = RunSettings::default().temp_dir("work");
  let base_dir = settings.resolved_base_dir().unwrap();
  assert!(base_dir.is_absolute());
  let temp_dir = settings.resolved_temp_dir().unwrap();
  assert!(temp_dir.is_absolute());
  assert!(temp_dir.ends_with("work"));
}
