//! AWS Price List Query API client
//!
//! Answers product queries with `AWSPriceListService.GetProducts`:
//!
//! ```text
//! POST {endpoint}/
//! X-Amz-Target: AWSPriceListService.GetProducts
//! {"ServiceCode": "AmazonEC2", "Filters": [...], "FormatVersion": "aws_v1", "MaxResults": 1}
//! ```
//!
//! The response's `PriceList` holds one JSON document per product. Transport
//! failures and non-2xx answers are transient catalog errors; a response that
//! can't be decoded is an extraction error.

use crate::config::PricingSettings;
use crate::sigv4::{SignableRequest, SigV4Signer};
use chrono::Utc;
use jobcost_common::{JobCostError, PricingError, Result};
use jobcost_pricing::{ProductQuery, RemotePriceSource, TermFilter};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const SERVICE: &str = "pricing";
const GET_PRODUCTS_TARGET: &str = "AWSPriceListService.GetProducts";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const FORMAT_VERSION: &str = "aws_v1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetProductsRequest<'a> {
    service_code: &'a str,
    filters: Vec<TermFilter>,
    format_version: &'static str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetProductsResponse {
    #[serde(default)]
    price_list: Vec<String>,
}

/// Blocking client for the Price List Query API
pub struct AwsPricingClient {
    client: Client,
    endpoint: Url,
    host: String,
    signer: SigV4Signer,
    max_results: u32,
}

impl AwsPricingClient {
    pub fn new(settings: &PricingSettings) -> Result<Self> {
        let credentials = settings.credentials()?;

        let endpoint = Url::parse(&settings.endpoint).map_err(|e| {
            JobCostError::Config(format!("Invalid pricing endpoint '{}': {}", settings.endpoint, e))
        })?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(JobCostError::Config(format!(
                    "Pricing endpoint '{}' has no host",
                    settings.endpoint
                )))
            }
        };

        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| JobCostError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            host,
            signer: SigV4Signer::new(credentials, settings.signing_region.clone(), SERVICE),
            max_results: settings.max_results.max(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

impl RemotePriceSource for AwsPricingClient {
    #[instrument(skip(self, query), fields(instance_type = %query.instance_type))]
    fn get_products(&self, query: &ProductQuery) -> std::result::Result<Vec<String>, PricingError> {
        let body = serde_json::to_vec(&GetProductsRequest {
            service_code: &query.service_code,
            filters: query.filters(),
            format_version: FORMAT_VERSION,
            max_results: self.max_results,
        })
        .map_err(|e| PricingError::Extraction(format!("unencodable product query: {}", e)))?;

        let signed = self
            .signer
            .sign(
                &SignableRequest {
                    method: "POST",
                    host: &self.host,
                    path: self.endpoint.path(),
                    query: "",
                    headers: &[("content-type", AMZ_JSON), ("x-amz-target", GET_PRODUCTS_TARGET)],
                    payload: &body,
                },
                Utc::now(),
            )
            .map_err(|e| PricingError::Catalog(format!("request signing failed: {}", e)))?;

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", AMZ_JSON)
            .header("X-Amz-Target", GET_PRODUCTS_TARGET)
            .header("X-Amz-Date", &signed.amz_date)
            .header("Authorization", &signed.authorization)
            .body(body);
        if let Some(token) = &signed.security_token {
            request = request.header("X-Amz-Security-Token", token);
        }

        let response = request
            .send()
            .map_err(|e| PricingError::Catalog(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PricingError::Catalog(format!(
                "GetProducts returned {}: {}",
                status, body
            )));
        }

        let parsed: GetProductsResponse = response
            .json()
            .map_err(|e| PricingError::Extraction(format!("invalid GetProducts response: {}", e)))?;

        debug!(status = %status, products = parsed.price_list.len(), "Fetched price list");
        Ok(parsed.price_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(endpoint: &str) -> PricingSettings {
        PricingSettings {
            enabled: true,
            endpoint: endpoint.to_string(),
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            request_timeout_secs: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_request_body_shape() {
        let query = ProductQuery::on_demand_linux("US East (N. Virginia)", "m5.xlarge");
        let json = serde_json::to_value(GetProductsRequest {
            service_code: &query.service_code,
            filters: query.filters(),
            format_version: FORMAT_VERSION,
            max_results: 1,
        })
        .unwrap();

        assert_eq!(json["ServiceCode"], "AmazonEC2");
        assert_eq!(json["FormatVersion"], "aws_v1");
        assert_eq!(json["MaxResults"], 1);
        assert_eq!(json["Filters"][2]["Type"], "TERM_MATCH");
        assert_eq!(json["Filters"][2]["Field"], "instanceType");
        assert_eq!(json["Filters"][2]["Value"], "m5.xlarge");
    }

    #[test]
    fn test_response_price_list() {
        let parsed: GetProductsResponse = serde_json::from_str(
            r#"{"FormatVersion": "aws_v1", "PriceList": ["{\"terms\": {}}"], "NextToken": "x"}"#,
        )
        .unwrap();
        assert_eq!(parsed.price_list, vec![r#"{"terms": {}}"#.to_string()]);

        let empty: GetProductsResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.price_list.is_empty());
    }

    #[test]
    fn test_host_includes_explicit_port() {
        let client = AwsPricingClient::new(&settings("http://127.0.0.1:8443")).unwrap();
        assert_eq!(client.host, "127.0.0.1:8443");

        let client = AwsPricingClient::new(&settings("https://api.pricing.us-east-1.amazonaws.com"))
            .unwrap();
        assert_eq!(client.host, "api.pricing.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let mut settings = settings("https://api.pricing.us-east-1.amazonaws.com");
        settings.secret_access_key = None;

        assert!(matches!(
            AwsPricingClient::new(&settings),
            Err(JobCostError::Config(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_transient() {
        let client = AwsPricingClient::new(&settings("http://127.0.0.1:9")).unwrap();
        let query = ProductQuery::on_demand_linux("US East (N. Virginia)", "m5.xlarge");

        let err = client.get_products(&query).unwrap_err();
        assert!(err.is_transient());
    }
}
