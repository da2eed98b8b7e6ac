//! Financing mix, loan amortisation and fiscal burden per scenario.

use serde::Serialize;

use crate::config::FinancingConfig;
use crate::model::discount::{npv_at_rate, present_value};
use crate::model::scenario::ScenarioId;

/// Terms of one loan type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LoanTerms {
    pub rate: f64,
    pub tenor_years: u32,
    pub grace_years: u32,
}

/// Repayment profile of one disbursement.
#[derive(Debug, Clone)]
pub struct Amortization {
    /// Debt service in years 1..=tenor after disbursement.
    pub payments: Vec<f64>,
    /// Outstanding principal after each payment.
    pub balance: Vec<f64>,
}

impl LoanTerms {
    /// Level annuity payment on `principal` over `periods` years.
    fn annuity(&self, principal: f64, periods: u32) -> f64 {
        if periods == 0 {
            return principal;
        }
        if self.rate.abs() < 1e-12 {
            return principal / periods as f64;
        }
        principal * self.rate / (1.0 - (1.0 + self.rate).powi(-(periods as i32)))
    }

    /// Interest-only during grace, then a level annuity over the remaining tenor.
    pub fn amortize(&self, principal: f64) -> Amortization {
        let repay_years = self.tenor_years.saturating_sub(self.grace_years);
        let annuity = self.annuity(principal, repay_years);
        let mut payments = Vec::with_capacity(self.tenor_years as usize);
        let mut balance = Vec::with_capacity(self.tenor_years as usize);
        let mut outstanding = principal;

        for year in 1..=self.tenor_years {
            let interest = outstanding * self.rate;
            if year <= self.grace_years {
                payments.push(interest);
            } else {
                outstanding -= annuity - interest;
                payments.push(annuity);
            }
            balance.push(outstanding.max(0.0));
        }
        Amortization { payments, balance }
    }

    /// Grant element of the loan at `reference_rate` (0 = market, 1 = grant).
    pub fn grant_element(&self, reference_rate: f64) -> f64 {
        let mut flows = vec![0.0];
        flows.extend(self.amortize(1.0).payments);
        1.0 - npv_at_rate(&flows, reference_rate)
    }
}

/// Financing outcome for one scenario's capex programme.
#[derive(Debug, Clone, Serialize)]
pub struct FinancingSummary {
    pub scenario: ScenarioId,
    pub total_capex_usd_m: f64,
    pub grant_usd_m: f64,
    pub concessional_usd_m: f64,
    pub commercial_usd_m: f64,
    /// Debt service per analysis year (USD m).
    pub debt_service_usd_m: Vec<f64>,
    pub peak_debt_service_usd_m: f64,
    pub total_debt_service_usd_m: f64,
    pub pv_debt_service_usd_m: f64,
    /// Principal still owed after the last analysis year.
    pub outstanding_principal_usd_m: f64,
    /// Weighted interest cost of the financing mix (grants at zero).
    pub blended_rate: f64,
    pub concessional_grant_element: f64,
    pub commercial_grant_element: f64,
}

impl FinancingSummary {
    /// Finances each year's capex with the configured mix.
    ///
    /// # Arguments
    ///
    /// * `scenario` - Scenario the capex belongs to
    /// * `capex` - Capex per analysis year (USD m)
    /// * `cfg` - Financing mix and loan terms
    /// * `df` - Social discount factors for the PV of debt service
    pub fn compute(scenario: ScenarioId, capex: &[f64], cfg: &FinancingConfig, df: &[f64]) -> Self {
        let concessional = LoanTerms {
            rate: cfg.concessional_rate,
            tenor_years: cfg.concessional_tenor_years,
            grace_years: cfg.concessional_grace_years,
        };
        let commercial = LoanTerms {
            rate: cfg.commercial_rate,
            tenor_years: cfg.commercial_tenor_years,
            grace_years: cfg.commercial_grace_years,
        };
        let commercial_share = cfg.commercial_share();

        let n = capex.len();
        let last = n.saturating_sub(1);
        let mut debt_service = vec![0.0; n];
        let mut outstanding = 0.0;

        for (year, &amount) in capex.iter().enumerate() {
            if amount <= 0.0 {
                continue;
            }
            for (terms, share) in [
                (concessional, cfg.concessional_share),
                (commercial, commercial_share),
            ] {
                let principal = amount * share;
                if principal <= 0.0 {
                    continue;
                }
                let schedule = terms.amortize(principal);
                for (k, payment) in schedule.payments.iter().enumerate() {
                    let t = year + k + 1;
                    if t < n {
                        debt_service[t] += payment;
                    }
                }
                // Years elapsed since disbursement at the end of the horizon
                let elapsed = last - year;
                outstanding += if elapsed == 0 {
                    principal
                } else {
                    schedule.balance.get(elapsed - 1).copied().unwrap_or(0.0)
                };
            }
        }

        let total_capex: f64 = capex.iter().sum();
        Self {
            scenario,
            total_capex_usd_m: total_capex,
            grant_usd_m: total_capex * cfg.grant_share,
            concessional_usd_m: total_capex * cfg.concessional_share,
            commercial_usd_m: total_capex * commercial_share,
            peak_debt_service_usd_m: debt_service.iter().copied().fold(0.0, f64::max),
            total_debt_service_usd_m: debt_service.iter().sum(),
            pv_debt_service_usd_m: present_value(&debt_service, df),
            debt_service_usd_m: debt_service,
            outstanding_principal_usd_m: outstanding,
            blended_rate: cfg.concessional_share * cfg.concessional_rate
                + commercial_share * cfg.commercial_rate,
            concessional_grant_element: concessional.grant_element(cfg.reference_rate),
            commercial_grant_element: commercial.grant_element(cfg.reference_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annuity_repays_principal() {
        let terms = LoanTerms {
            rate: 0.05,
            tenor_years: 10,
            grace_years: 2,
        };
        let a = terms.amortize(100.0);
        assert_eq!(a.payments.len(), 10);
        assert!((a.payments[0] - 5.0).abs() < 1e-9);
        assert!((a.payments[1] - 5.0).abs() < 1e-9);
        assert!(a.balance.last().copied().unwrap_or(1.0).abs() < 1e-6);
        // PV of payments at the loan rate equals the principal
        let mut flows = vec![0.0];
        flows.extend(&a.payments);
        assert!((npv_at_rate(&flows, 0.05) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn zero_rate_loan_repays_linearly() {
        let terms = LoanTerms {
            rate: 0.0,
            tenor_years: 4,
            grace_years: 0,
        };
        let a = terms.amortize(100.0);
        assert_eq!(a.payments, vec![25.0, 25.0, 25.0, 25.0]);
    }

    #[test]
    fn concessional_loan_has_higher_grant_element() {
        let cfg = FinancingConfig::default();
        let conc = LoanTerms {
            rate: cfg.concessional_rate,
            tenor_years: cfg.concessional_tenor_years,
            grace_years: cfg.concessional_grace_years,
        };
        let comm = LoanTerms {
            rate: cfg.commercial_rate,
            tenor_years: cfg.commercial_tenor_years,
            grace_years: cfg.commercial_grace_years,
        };
        let ge_conc = conc.grant_element(cfg.reference_rate);
        let ge_comm = comm.grant_element(cfg.reference_rate);
        assert!(ge_conc > ge_comm);
        assert!(ge_conc > 0.35);
        // market-rate loan has no grant element
        let market = LoanTerms {
            rate: 0.10,
            tenor_years: 10,
            grace_years: 0,
        };
        assert!(market.grant_element(0.10).abs() < 1e-9);
    }

    #[test]
    fn summary_splits_capex_by_mix() {
        let cfg = FinancingConfig::default();
        let capex = vec![100.0, 0.0, 0.0, 0.0];
        let s = FinancingSummary::compute(ScenarioId::NationalGrid, &capex, &cfg, &[1.0; 4]);
        assert!((s.grant_usd_m - 15.0).abs() < 1e-9);
        assert!((s.concessional_usd_m - 45.0).abs() < 1e-9);
        assert!((s.commercial_usd_m - 40.0).abs() < 1e-9);
        assert_eq!(s.debt_service_usd_m[0], 0.0);
        // year 1: concessional interest + commercial interest during grace
        let expected = 45.0 * cfg.concessional_rate + 40.0 * cfg.commercial_rate;
        assert!((s.debt_service_usd_m[1] - expected).abs() < 1e-9);
        assert!(s.outstanding_principal_usd_m > 0.0);
        assert!(s.outstanding_principal_usd_m <= 85.0 + 1e-9);
    }

    #[test]
    fn no_capex_no_debt() {
        let cfg = FinancingConfig::default();
        let s = FinancingSummary::compute(ScenarioId::StatusQuo, &[0.0; 5], &cfg, &[1.0; 5]);
        assert_eq!(s.total_debt_service_usd_m, 0.0);
        assert_eq!(s.peak_debt_service_usd_m, 0.0);
        assert_eq!(s.outstanding_principal_usd_m, 0.0);
    }
}
