use std::collections::HashMap;

use crate::metrics::Category;

fn tags(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Tag spellings for the scored (rank-based) resolution path, one ordered
/// list per scalar metric of the flat per-filing record.
#[derive(Debug, Clone)]
pub struct ScalarTagMap {
    pub assets: Vec<String>,
    pub net_assets: Vec<String>,
    pub cash: Vec<String>,
    pub debt: Vec<String>,
    pub op_income: Vec<String>,
    pub net_income: Vec<String>,
    pub depreciation: Vec<String>,
    pub issued_shares: Vec<String>,
    pub treasury_shares: Vec<String>,
    pub operating_cf: Vec<String>,
    pub capex: Vec<String>,
}

/// Immutable configuration for one engine instance. Priority lists, summation
/// groups and heuristic marker sets are data, not logic, so alternative
/// taxonomy versions can be tested side by side.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Ordered candidate spellings per single-tag category, least ambiguous
    /// first (J-GAAP summary tags, then IFRS, then US-GAAP, then generic).
    pub priority_tags: HashMap<Category, Vec<String>>,
    /// Summation groups: every spelling with data contributes to the total.
    pub group_tags: HashMap<Category, Vec<String>>,
    pub scalar_tags: ScalarTagMap,
    /// Tags whose facts anchor period-end inference, in priority order.
    pub anchor_tags: Vec<String>,
    /// Context-id substrings suggesting a prior-period context (lowercased).
    pub prior_markers: Vec<String>,
    /// Context-id substrings marking a sub-segment breakdown; such contexts
    /// never represent a top-level metric.
    pub segment_markers: Vec<String>,
    /// Context-id substrings marking separate/individual reporting.
    pub separate_markers: Vec<String>,
    pub non_consolidated_marker: String,
    /// Candidates farther than this from the rank target are excluded.
    pub date_margin_days: i64,
    /// Tolerance when matching a context end date against a period boundary.
    pub bucket_tolerance_days: i64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let mut priority_tags = HashMap::new();
        priority_tags.insert(
            Category::Sales,
            tags(&[
                "OrdinaryIncomeSummaryOfBusinessResults",
                "RevenueIFRSSummaryOfBusinessResults",
                "RevenuesUSGAAPSummaryOfBusinessResults",
                "NetSalesSummaryOfBusinessResults",
                "SalesAndFinancialServicesRevenueIFRS",
                "TotalNetRevenuesIFRS",
                "SalesRevenuesIFRS",
                "OperatingRevenuesIFRSKeyFinancialData",
                "OrdinaryRevenue",
                "OperatingRevenue1",
                "Revenue",
                "NetSales",
                "Revenues",
            ]),
        );
        priority_tags.insert(
            Category::OpIncome,
            tags(&[
                "OperatingProfitLossIFRSSummaryOfBusinessResults",
                "OperatingIncomeLossSummaryOfBusinessResults",
                "OrdinaryIncomeLossSummaryOfBusinessResults",
                "OrdinaryProfit",
                "OrdinaryIncome",
                "OrdinaryIncomeLoss",
                "OperatingProfit",
                "OperatingIncome",
                "OperatingProfitLossIFRS",
                "ProfitLossFromOperatingActivities",
                "ProfitLossBeforeTaxIFRSSummaryOfBusinessResults",
                "ProfitLossBeforeTaxUSGAAPSummaryOfBusinessResults",
                "ProfitLossBeforeTaxIFRS",
            ]),
        );
        priority_tags.insert(
            Category::NetIncome,
            tags(&[
                "ProfitLossAttributableToOwnersOfParentIFRSSummaryOfBusinessResults",
                "NetIncomeLossAttributableToOwnersOfParentUSGAAPSummaryOfBusinessResults",
                "ProfitLossAttributableToOwnersOfParentSummaryOfBusinessResults",
                "ProfitLossAttributableToOwnersOfParent",
                "NetIncome",
                "ProfitLoss",
            ]),
        );
        priority_tags.insert(
            Category::TotalAssets,
            tags(&[
                "TotalAssetsIFRSSummaryOfBusinessResults",
                "TotalAssetsUSGAAPSummaryOfBusinessResults",
                "TotalAssetsSummaryOfBusinessResults",
                "AssetsIFRS",
                "Assets",
                "TotalAssets",
            ]),
        );
        priority_tags.insert(
            Category::NetAssets,
            tags(&[
                "NetAssetsSummaryOfBusinessResults",
                "EquityIFRS",
                "TotalEquity",
                "NetAssets",
            ]),
        );
        priority_tags.insert(
            Category::OpCashFlow,
            tags(&[
                "NetCashProvidedByUsedInOperatingActivitiesSummaryOfBusinessResults",
                "NetCashProvidedByUsedInOperatingActivities",
                "CashFlowsFromUsedInOperatingActivitiesIFRSSummaryOfBusinessResults",
                "CashFlowsFromUsedInOperatingActivitiesUSGAAPSummaryOfBusinessResults",
            ]),
        );
        priority_tags.insert(
            Category::CurrentAssets,
            tags(&["CurrentAssets", "AssetsCurrent", "CurrentAssetsIFRS"]),
        );
        priority_tags.insert(
            Category::CurrentLiabilities,
            tags(&["CurrentLiabilities", "LiabilitiesCurrent"]),
        );
        priority_tags.insert(
            Category::RetainedEarnings,
            tags(&["RetainedEarnings", "RetainedEarningsIFRS"]),
        );
        priority_tags.insert(
            Category::CashAndEquivalents,
            tags(&["CashAndCashEquivalents", "CashAndDeposits"]),
        );
        priority_tags.insert(
            Category::Ppe,
            tags(&["PropertyPlantAndEquipment", "PropertyPlantAndEquipmentNet"]),
        );

        let mut group_tags = HashMap::new();
        group_tags.insert(
            Category::Receivables,
            tags(&[
                "AccountsReceivableTrade",
                "NotesReceivableTrade",
                "TradeAndOtherReceivables",
                "TradeAndOtherReceivables3CAIFRS",
                "TradeAndOtherReceivablesCAIFRS",
                "TradeReceivablesOtherReceivablesAndContractAssetsCAIFRS",
                "ReceivablesRelatedToFinancialServicesCAIFRS",
                "NotesAndAccountsReceivableTradeAndContractAssets",
                "TradeReceivables2AssetsIFRS",
                "LeaseReceivablesCA",
                "AccountsReceivableInstallmentSalesCALEA",
                "OperatingLoansCA",
                "LoansInCreditCardBusinessAssetsIFRS",
                "LoansInBankingBusinessAssetsIFRS",
                "InstallmentLoans",
                "NetInvestmentInLeases",
                "LoansToCustomers",
                "FinanceLeaseReceivables",
                "InvestmentInDirectFinancingLeases",
                "OperatingLoans",
                "LeaseInvestmentAssets",
                "Loans",
                "InstallmentReceivables",
            ]),
        );
        group_tags.insert(
            Category::Inventory,
            tags(&[
                "Inventories",
                "MerchandiseAndFinishedGoods",
                "WorkInProcess",
                "InventoriesCAIFRS",
                "MerchandiseCAIFRS",
                "FinishedGoodsCAIFRS",
                "RawMaterialsAndSuppliesCAIFRS",
                "InventoriesIFRS",
                "InventoriesAssetsIFRS",
                "RealEstateForSale",
                "RealEstateUnderDevelopment",
                "RealEstateForSaleInProcess",
                "OperationalInvestmentSecurities",
                "FinancialAssetsForTheSecuritiesBusinessAssetsIFRS",
                "RealEstateHeldForSale",
                "AdvancesForRealEstate",
                "TradingSecurities",
                "MarketableSecurities",
                "Merchandise",
            ]),
        );
        group_tags.insert(
            Category::Payables,
            tags(&[
                "AccountsPayableTrade",
                "NotesPayableTrade",
                "TradeAndOtherPayables",
                "TradeAndOtherPayables3CLIFRS",
                "TradeAndOtherPayablesCLIFRS",
                "AccountsPayableTradeLiabilitiesIFRS",
                "NotesAndAccountsPayableTrade",
                "FinancialLiabilitiesForSecuritiesBusinessLiabilitiesIFRS",
            ]),
        );

        let scalar_tags = ScalarTagMap {
            assets: tags(&[
                "TotalAssets",
                "Assets",
                "AssetsIFRS",
                "TotalAssetsIFRSSummaryOfBusinessResults",
                "AssetsUSGAAP",
            ]),
            net_assets: tags(&[
                "NetAssets",
                "TotalNetAssets",
                "NetAssetsSummaryOfBusinessResults",
                "TotalEquity",
                "Equity",
            ]),
            cash: tags(&[
                "CashAndDeposits",
                "CashAndCashEquivalents",
                "CashAndCashEquivalentsIFRS",
            ]),
            debt: tags(&[
                "ShortTermLoansPayable",
                "CurrentPortionOfLongTermLoansPayable",
                "LongTermLoansPayable",
                "BondsPayable",
                "InterestBearingDebt",
                "BorrowingsCurrent",
                "BorrowingsNonCurrent",
            ]),
            op_income: tags(&[
                "OperatingIncome",
                "OperatingIncomeLoss",
                "OperatingProfit",
                "OperatingProfitIFRS",
            ]),
            net_income: tags(&[
                "CurrentNetIncome",
                "NetIncome",
                "ProfitLoss",
                "Profit",
                "NetIncomeLoss",
                "ProfitLossAttributableToOwnersOfParent",
            ]),
            depreciation: tags(&[
                "Depreciation",
                "DepreciationAndAmortization",
                "DepreciationAndAmortizationOpeCF",
                "DepreciationExpense",
                "AmortizationExpense",
            ]),
            issued_shares: tags(&[
                "TotalNumberOfIssuedSharesSummaryOfBusinessResults",
                "TotalNumberOfIssuedShares",
                "IssuedShares",
                "NumberOfSharesIssued",
                "NumberOfSharesIssuedSharesVotingRights",
                "NumberOfIssuedSharesAsOfFiscalYearEndIssuedSharesTotalNumberOfSharesEtc",
                "NumberOfIssuedSharesAsOfFilingDateIssuedSharesTotalNumberOfSharesEtc",
            ]),
            treasury_shares: tags(&[
                "TreasuryStockNumberOfShares",
                "NumberOfSharesHeldInOwnNameTreasurySharesEtc",
                "TotalNumberOfSharesHeldTreasurySharesEtc",
                "TreasuryStock",
                "TreasuryShares",
            ]),
            operating_cf: tags(&[
                "NetCashProvidedByUsedInOperatingActivities",
                "CashFlowsFromOperatingActivities",
                "CashFlowsFromUsedInOperatingActivities",
            ]),
            capex: tags(&[
                "PurchaseOfPropertyPlantAndEquipmentInvCF",
                "PurchaseOfPropertyPlantAndEquipment",
                "PurchaseOfTangibleFixedAssets",
                "PaymentsForPropertyPlantAndEquipment",
                "IncreaseInPropertyPlantAndEquipmentAndIntangibleAssets",
                "CapitalExpendituresOverviewOfCapitalExpendituresEtc",
                "CapitalExpenditures",
            ]),
        };

        ResolverConfig {
            priority_tags,
            group_tags,
            scalar_tags,
            anchor_tags: tags(&[
                "NetAssets",
                "Assets",
                "AssetsIFRS",
                "TotalAssetsIFRSSummaryOfBusinessResults",
                "Sales",
                "OperatingIncome",
            ]),
            prior_markers: tags(&["prior", "prev", "ly"]),
            segment_markers: tags(&["Segment", "Row", "Column"]),
            separate_markers: tags(&["Separate", "Individual"]),
            non_consolidated_marker: "NonConsolidated".to_string(),
            date_margin_days: 90,
            bucket_tolerance_days: 1,
        }
    }
}
