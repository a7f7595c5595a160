mod router_scenarios;
