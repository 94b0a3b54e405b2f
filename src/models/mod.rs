//! Result documents returned by the search backend

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// License attached to a package
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct License {
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Package maintainer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Maintainer {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A package document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Package {
    #[serde(rename = "package_attr_name")]
    pub attr_name: String,

    #[serde(rename = "package_attr_set", default)]
    pub attr_set: Option<String>,

    #[serde(rename = "package_pname", default)]
    pub pname: String,

    #[serde(rename = "package_pversion", default)]
    pub version: String,

    #[serde(rename = "package_description", default)]
    pub description: Option<String>,

    #[serde(rename = "package_longDescription", default)]
    pub long_description: Option<String>,

    #[serde(rename = "package_license", default)]
    pub licenses: Vec<License>,

    #[serde(rename = "package_maintainers", default)]
    pub maintainers: Vec<Maintainer>,

    #[serde(rename = "package_platforms", default)]
    pub platforms: Vec<String>,

    #[serde(rename = "package_programs", default)]
    pub programs: Vec<String>,

    #[serde(rename = "package_homepage", default)]
    pub homepage: Vec<String>,

    #[serde(rename = "flake_name", default)]
    pub flake_name: Option<String>,
}

/// A NixOS module option document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NixOption {
    #[serde(rename = "option_name")]
    pub name: String,

    #[serde(rename = "option_description", default)]
    pub description: Option<String>,

    #[serde(rename = "option_type", default)]
    pub option_type: Option<String>,

    #[serde(rename = "option_default", default)]
    pub default: Option<String>,

    #[serde(rename = "option_example", default)]
    pub example: Option<String>,

    #[serde(rename = "option_source", default)]
    pub source: Option<String>,

    #[serde(rename = "flake_name", default)]
    pub flake_name: Option<String>,
}

/// Facet bucket count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// A validated page of search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults<T> {
    /// Total hit count across all pages
    pub total: u64,

    /// The returned page of documents
    pub results: Vec<T>,

    /// Facet counts keyed by aggregation field
    #[serde(default)]
    pub facets: BTreeMap<String, Vec<FacetCount>>,
}
