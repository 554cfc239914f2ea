use crate::core::cart::Product;
use crate::core::report::ReportFormat;
use crate::core::steps::{Step, StepAction};
use crate::utils::error::{HarnessError, Result};
use crate::utils::validation::{
    validate_allowed_values, validate_non_empty_string, validate_path, validate_positive_number,
    validate_positive_price, validate_unique_names, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 內建的 Mini E-Kart 測試套件
const BUILTIN_SUITE: &str = include_str!("../../suites/ekart.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub suite: SuiteInfo,
    pub page: PageConfig,
    #[serde(default)]
    pub report: ReportConfig,
    pub features: Vec<FeatureDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub title: String,
    /// 標題中必須出現的字串，預設為 "Mini E-Kart"
    pub expected_title: Option<String>,
    pub products: Vec<ProductConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: String,
    pub formats: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: "./reports".to_string(),
            formats: ReportFormat::NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDefinition {
    pub name: String,
    pub description: Option<String>,
    pub scenarios: Vec<ScenarioDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    pub steps: Vec<Step>,
}

impl PageConfig {
    pub fn expected_title(&self) -> &str {
        self.expected_title.as_deref().unwrap_or("Mini E-Kart")
    }

    pub fn catalog(&self) -> Vec<Product> {
        self.products
            .iter()
            .map(|p| Product::new(p.name.clone(), p.price))
            .collect()
    }

    pub fn has_product(&self, name: &str) -> bool {
        self.products.iter().any(|p| p.name == name)
    }
}

impl ReportConfig {
    pub fn report_formats(&self) -> Result<Vec<ReportFormat>> {
        self.formats.iter().map(|f| f.parse()).collect()
    }
}

impl SuiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HarnessError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| HarnessError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 內建套件
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_SUITE)
    }

    /// 替換環境變數 (例如 ${REPORT_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR
            .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureDefinition> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn scenario_count(&self) -> usize {
        self.features.iter().map(|f| f.scenarios.len()).sum()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("suite.name", &self.suite.name)?;
        validate_non_empty_string("page.title", &self.page.title)?;

        // 驗證商品目錄
        validate_positive_number("page.products", self.page.products.len(), 1)?;
        for product in &self.page.products {
            validate_non_empty_string("page.products.name", &product.name)?;
            validate_positive_price(&format!("page.products.{}.price", product.name), product.price)?;
        }
        validate_unique_names(
            "page.products",
            self.page.products.iter().map(|p| p.name.as_str()),
        )?;

        // 驗證報告設定
        validate_path("report.output_path", &self.report.output_path)?;
        validate_allowed_values("report.formats", &self.report.formats, &ReportFormat::NAMES)?;

        // 驗證功能與情境
        validate_positive_number("features", self.features.len(), 1)?;
        validate_unique_names("features", self.features.iter().map(|f| f.name.as_str()))?;
        for feature in &self.features {
            validate_non_empty_string("features.name", &feature.name)?;
            validate_positive_number(
                &format!("features.{}.scenarios", feature.name),
                feature.scenarios.len(),
                1,
            )?;
            validate_unique_names(
                &format!("features.{}.scenarios", feature.name),
                feature.scenarios.iter().map(|s| s.name.as_str()),
            )?;
            for scenario in &feature.scenarios {
                let field = format!("features.{}.scenarios.{}", feature.name, scenario.name);
                validate_non_empty_string(&field, &scenario.name)?;
                validate_positive_number(&format!("{}.steps", field), scenario.steps.len(), 1)?;
                for step in &scenario.steps {
                    self.validate_step(&field, step)?;
                }
            }
        }

        Ok(())
    }

    fn validate_step(&self, field: &str, step: &Step) -> Result<()> {
        if let Some(product) = step.action.product() {
            if !self.page.has_product(product) {
                return Err(HarnessError::InvalidConfigValueError {
                    field: format!("{}.steps", field),
                    value: product.to_string(),
                    reason: "Product is not in the page catalogue".to_string(),
                });
            }
        }

        match &step.action {
            StepAction::AddProducts { count } => {
                validate_positive_number(&format!("{}.steps.count", field), *count, 1)
            }
            StepAction::TotalEquals { amount } | StepAction::ProductPrice { amount, .. }
                if !amount.is_finite() || *amount < 0.0 =>
            {
                Err(HarnessError::InvalidConfigValueError {
                    field: format!("{}.steps.amount", field),
                    value: amount.to_string(),
                    reason: "Amount must be zero or positive".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl Validate for SuiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
