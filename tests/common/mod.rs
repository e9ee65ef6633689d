//! Shared fixtures: an API catalogue record with an audit base record

#![allow(dead_code)]

use sheetbind::core::{ColumnDescriptor, Record, Template};
use sheetbind::error::{ErrorCode, FieldError};
use sheetbind::types::Value;
use std::fmt;

/// Where an API is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    System,
    Operation,
    Tenant,
}

impl Platform {
    pub fn label(&self) -> &'static str {
        match self {
            Platform::System => "系统",
            Platform::Operation => "运营",
            Platform::Tenant => "租户",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "系统" => Some(Platform::System),
            "运营" => Some(Platform::Operation),
            "租户" => Some(Platform::Tenant),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Audit fields shared by every entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseEntity {
    pub id: Option<i64>,
    pub remark: String,
}

impl Record for BaseEntity {
    fn type_name(&self) -> &str {
        "BaseEntity"
    }

    fn declared_fields(&self) -> Vec<&str> {
        vec!["id", "remark"]
    }

    fn read_declared(&self, field: &str) -> Result<Value, FieldError> {
        match field {
            "id" => Ok(self.id.into()),
            "remark" => Ok(self.remark.clone().into()),
            other => Err(FieldError::no_such_field(self.type_name(), other)),
        }
    }

    fn write_declared(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "id" => self.id = value.into_field(field)?,
            "remark" => self.remark = value.into_field(field)?,
            other => return Err(FieldError::no_such_field(self.type_name(), other)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiEntity {
    pub base: BaseEntity,
    pub project: String,
    pub name: String,
    pub code: String,
    pub url: String,
    pub platform: Option<Platform>,
}

impl ApiEntity {
    pub fn new(project: &str, name: &str, code: &str, url: &str, platform: Platform) -> Self {
        Self {
            base: BaseEntity::default(),
            project: project.to_string(),
            name: name.to_string(),
            code: code.to_string(),
            url: url.to_string(),
            platform: Some(platform),
        }
    }
}

impl Record for ApiEntity {
    fn type_name(&self) -> &str {
        "ApiEntity"
    }

    fn declared_fields(&self) -> Vec<&str> {
        vec!["project", "name", "code", "url", "platform"]
    }

    fn read_declared(&self, field: &str) -> Result<Value, FieldError> {
        match field {
            "project" => Ok(self.project.clone().into()),
            "name" => Ok(self.name.clone().into()),
            "code" => Ok(self.code.clone().into()),
            "url" => Ok(self.url.clone().into()),
            "platform" => Ok(self.platform.map(Value::custom).unwrap_or_default()),
            other => Err(FieldError::no_such_field(self.type_name(), other)),
        }
    }

    fn write_declared(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "project" => self.project = value.into_field(field)?,
            "name" => self.name = value.into_field(field)?,
            "code" => self.code = value.into_field(field)?,
            "url" => self.url = value.into_field(field)?,
            "platform" => self.platform = value.into_optional_custom(field)?,
            other => return Err(FieldError::no_such_field(self.type_name(), other)),
        }
        Ok(())
    }

    fn parent(&self) -> Option<&dyn Record> {
        Some(&self.base)
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Record> {
        Some(&mut self.base)
    }
}

pub const TITLES: [&str; 5] = ["项目名", "接口名称", "接口编码", "接口地址", "资源属性"];

fn platform_column() -> ColumnDescriptor {
    ColumnDescriptor::new("资源属性", "platform", 10)
        .required()
        .with_validator(|raw| {
            Platform::from_label(raw)
                .is_none()
                .then_some(ErrorCode::ContentBeyondRange)
        })
        .with_import_resolver(|raw| {
            Platform::from_label(raw)
                .map(Value::custom)
                .unwrap_or_default()
        })
        .with_export_resolver(|value| {
            value
                .custom_ref::<Platform>()
                .map(|platform| platform.label().to_string())
                .unwrap_or_default()
        })
}

/// 项目名 / 接口名称 / 接口编码 / 接口地址 / 资源属性
pub fn api_template() -> Template {
    Template::new(
        "api",
        vec![
            ColumnDescriptor::new("项目名", "project", 50).required(),
            ColumnDescriptor::new("接口名称", "name", 30).required(),
            ColumnDescriptor::new("接口编码", "code", 100).required(),
            ColumnDescriptor::new("接口地址", "url", 500).required(),
            platform_column(),
        ],
    )
    .unwrap()
}

/// The API template plus an optional 备注 column bound to the base record
pub fn api_template_with_remark() -> Template {
    let mut columns = api_template().columns().to_vec();
    columns.push(ColumnDescriptor::new("备注", "remark", 200));
    Template::new("api-remark", columns).unwrap()
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

pub fn header() -> Vec<String> {
    row(&TITLES)
}

pub fn user_api_row() -> Vec<String> {
    row(&["uc", "查询用户", "user.get", "/api/user/{id}", "系统"])
}
